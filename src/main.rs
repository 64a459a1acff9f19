#![forbid(unsafe_code)]

mod cache;
mod options;

use anyhow::{Context, Result};
use fieldgate_core::{
    Arguments, CompiledSchema, ConstValue, FieldError, ResolveArgs, ResolveInfo, SchemaConfig,
    ServerError,
};
use structopt::StructOpt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use value::Variables;

use options::{Command, Options};

// Use Jemalloc only for musl-64 bits platforms
#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn read_config(options: &Options) -> Result<SchemaConfig> {
    let path = options.config.display();
    toml::from_str::<SchemaConfig>(
        &std::fs::read_to_string(&options.config)
            .with_context(|| format!("Failed to load config file '{}'.", path))?,
    )
    .with_context(|| format!("Failed to parse config file '{}'.", path))
}

fn load_schema(options: &Options) -> Result<CompiledSchema> {
    let cache_path = cache::cached_file_path();
    let config = match cache::load(&cache_path)? {
        Some(config) => {
            tracing::debug!(path = %cache_path.display(), "Use cached configuration.");
            config
        }
        None => read_config(options)?,
    };
    config
        .build()
        .context("Failed to compile the schema config.")
}

fn parse_arguments(args: Option<&str>) -> Result<Arguments> {
    let args = match args {
        Some(args) => args,
        None => return Ok(Arguments::new()),
    };
    let json: serde_json::Value =
        serde_json::from_str(args).context("Arguments are not valid JSON.")?;
    match ConstValue::from_json(json).context("Arguments are not valid JSON.")? {
        ConstValue::Object(args) => Ok(args),
        _ => anyhow::bail!("Arguments must be a JSON object."),
    }
}

fn main() -> Result<()> {
    let options: Options = Options::from_args();
    init_tracing();

    match &options.command {
        Command::Cache => {
            let config = read_config(&options)?;
            cache::cache(&config, &cache::cached_file_path())?;
            println!("Configuration cached successfully!");
        }
        Command::Clear => {
            cache::clear(&cache::cached_file_path())?;
            println!("Configuration cache cleared!");
        }
        Command::Rules { field, args } => {
            let schema = load_schema(&options)?;
            let definition = schema
                .field(field)
                .with_context(|| format!("Field '{}' is not defined.", field))?;
            let args = parse_arguments(args.as_deref())?;
            let root = ConstValue::Null;
            let rules = definition.rules(&ResolveArgs::new(&root, &args, &(), None));
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
        Command::Validate { field, args, query } => {
            let schema = load_schema(&options)?;
            let definition = schema
                .field(field)
                .with_context(|| format!("Field '{}' is not defined.", field))?;
            let args = parse_arguments(Some(args))?;
            let root = ConstValue::Null;

            let errors = match definition.validate(&ResolveArgs::new(&root, &args, &(), None)) {
                Ok(()) => {
                    println!("Validation passed.");
                    return Ok(());
                }
                Err(errors) => errors,
            };

            let mut server_error = ServerError::from(FieldError::Validation(errors));
            if let Some(query) = query {
                let document = parser::parse_query(query).context("Failed to parse query.")?;
                let variables = Variables::default();
                let name = definition.name().unwrap_or_default();
                if let Some(info) = ResolveInfo::from_document(&document, None, &name, &variables)
                {
                    server_error = server_error.at(&info);
                }
            }
            println!("{}", serde_json::to_string_pretty(&server_error)?);
            anyhow::bail!("Validation failed.");
        }
    }

    Ok(())
}
