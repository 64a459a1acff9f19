use std::fs;
use std::path::Path;

use fieldgate_core::{Arguments, CompiledSchema, ConstValue, ResolveArgs, SchemaConfig};
use globset::GlobBuilder;
use once_cell::sync::Lazy;

static SCHEMA: Lazy<CompiledSchema> = Lazy::new(|| {
    toml::from_str::<SchemaConfig>(include_str!("schema.toml"))
        .unwrap()
        .build()
        .unwrap()
});

fn for_each_case(pattern: &str, mut f: impl FnMut(&str, Arguments, serde_json::Value)) {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .unwrap()
        .compile_matcher();
    let dir = Path::new(pattern).parent().unwrap();

    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        if !glob.is_match(entry.path()) {
            continue;
        }

        println!("{}", entry.path().display());

        let data = fs::read_to_string(&entry.path()).unwrap();
        let mut s = data.split("---");
        let mut n = 1;

        loop {
            println!("\tIndex: {}", n);
            let input = match s.next() {
                Some(input) => input.trim(),
                None => break,
            };
            let expect = s.next().unwrap();

            let (path, args) = input.split_once('\n').unwrap_or((input, ""));
            let args = match args.trim() {
                "" => Arguments::new(),
                args => match ConstValue::from_json(serde_json::from_str(args).unwrap()).unwrap() {
                    ConstValue::Object(args) => args,
                    _ => panic!("arguments must be an object"),
                },
            };
            let expect: serde_json::Value = serde_json::from_str(expect).unwrap();

            f(path.trim(), args, expect);
            n += 1;
        }
    }
}

#[test]
fn test_rules() {
    for_each_case("./tests/rules/*.txt", |path, args, expect| {
        let field = SCHEMA.field(path).unwrap();
        let root = ConstValue::Null;
        let rules = field.rules(&ResolveArgs::new(&root, &args, &(), None));
        let actual = serde_json::to_value(&rules).unwrap();
        assert_eq!(actual, expect);
    });
}

#[test]
fn test_validation() {
    for_each_case("./tests/validation/*.txt", |path, args, expect| {
        let field = SCHEMA.field(path).unwrap();
        let root = ConstValue::Null;
        let actual = match field.validate(&ResolveArgs::new(&root, &args, &(), None)) {
            Ok(()) => serde_json::json!({}),
            Err(errors) => serde_json::to_value(&errors).unwrap(),
        };
        assert_eq!(actual, expect);
    });
}
