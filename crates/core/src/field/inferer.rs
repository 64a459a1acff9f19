use value::Name;

use super::ResolveArgs;
use crate::schema::{InputObjectType, TypeRef, TypeRegistry};
use crate::validation::RuleSet;

/// Derives nested validation rules from the structure of argument types.
///
/// Rules declared on input object fields are collected under dotted keys, a
/// list type adds a `*` segment. Recursion stops at an input object that is
/// already being expanded further up the current path, so self-referencing
/// (and mutually referencing) input types terminate.
#[derive(Debug, Copy, Clone)]
pub struct RuleInferer<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> RuleInferer<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn infer_rules_from_type(
        &self,
        ty: &TypeRef,
        prefix: &str,
        args: &ResolveArgs<'_>,
    ) -> RuleSet {
        self.infer(ty, prefix, args, &mut Vec::new())
    }

    pub fn input_type_rules(
        &self,
        input: &InputObjectType,
        prefix: &str,
        args: &ResolveArgs<'_>,
    ) -> RuleSet {
        self.input_rules(input, prefix, args, &mut Vec::new())
    }

    fn infer(
        &self,
        ty: &TypeRef,
        prefix: &str,
        args: &ResolveArgs<'_>,
        expanding: &mut Vec<Name>,
    ) -> RuleSet {
        let ty = ty.nullable();
        let prefix = if ty.is_list() {
            format!("{}.*", prefix)
        } else {
            prefix.to_string()
        };

        match ty.concrete() {
            TypeRef::InputObject(name) => match self.registry.input_object(name) {
                Some(input) => self.input_rules(input, &prefix, args, expanding),
                None => {
                    tracing::warn!(type_name = %name, "Input object is not registered.");
                    RuleSet::new()
                }
            },
            // Scalars carry no nested rules.
            TypeRef::Scalar(_) | TypeRef::Object(_) | TypeRef::NonNull(_) | TypeRef::ListOf(_) => {
                RuleSet::new()
            }
        }
    }

    fn input_rules(
        &self,
        input: &InputObjectType,
        prefix: &str,
        args: &ResolveArgs<'_>,
        expanding: &mut Vec<Name>,
    ) -> RuleSet {
        let mut rules = RuleSet::new();
        expanding.push(input.name.clone());

        for (name, field) in &input.fields {
            let key = format!("{}.{}", prefix, name);

            if let Some(rule) = &field.rules {
                rules.insert(key.clone(), rule.resolve(args));
            }

            if let TypeRef::InputObject(type_name) = field.ty.concrete() {
                if expanding.contains(type_name) {
                    tracing::debug!(key = %key, type_name = %type_name, "Stop at self reference.");
                    continue;
                }
            }

            rules.extend(self.infer(&field.ty, &key, args, expanding));
        }

        expanding.pop();
        rules
    }
}

#[cfg(test)]
mod tests {
    use value::ConstValue;

    use super::*;
    use crate::field::Arguments;
    use crate::schema::InputField;
    use crate::validation::{Rule, RuleValue};

    fn infer(registry: &TypeRegistry, ty: &TypeRef, prefix: &str, args: &Arguments) -> RuleSet {
        let root = ConstValue::Null;
        let resolve_args = ResolveArgs::new(&root, args, &(), None);
        RuleInferer::new(registry).infer_rules_from_type(ty, prefix, &resolve_args)
    }

    fn rule_set(rules: &[(&str, &str)]) -> RuleSet {
        rules
            .iter()
            .map(|(key, rule)| (key.to_string(), RuleValue::from(*rule)))
            .collect()
    }

    fn address_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::default();
        registry
            .register_input(
                InputObjectType::new("AddressInput")
                    .field(InputField::new("city", TypeRef::scalar("String")).rules("required"))
                    .field(InputField::new("zip", TypeRef::scalar("String")).rules("size:5")),
            )
            .unwrap();
        registry
            .register_input(
                InputObjectType::new("PersonInput")
                    .field(
                        InputField::new("name", TypeRef::scalar("String").non_null())
                            .rules("required|min:2"),
                    )
                    .field(
                        InputField::new("address", TypeRef::input("AddressInput"))
                            .rules("array"),
                    )
                    .field(InputField::new("age", TypeRef::scalar("Int"))),
            )
            .unwrap();
        registry
    }

    #[test]
    fn scalar_has_no_rules() {
        let registry = address_registry();
        let rules = infer(
            &registry,
            &TypeRef::scalar("String").non_null(),
            "name",
            &Arguments::new(),
        );
        assert!(rules.is_empty());
    }

    #[test]
    fn nested_input_objects() {
        let registry = address_registry();
        let rules = infer(
            &registry,
            &TypeRef::input("PersonInput").non_null(),
            "input",
            &Arguments::new(),
        );
        assert_eq!(
            rules,
            rule_set(&[
                ("input.name", "required|min:2"),
                ("input.address", "array"),
                ("input.address.city", "required"),
                ("input.address.zip", "size:5"),
            ])
        );
        assert_eq!(
            rules.keys().collect::<Vec<_>>(),
            vec!["input.name", "input.address", "input.address.city", "input.address.zip"]
        );
    }

    #[test]
    fn list_adds_wildcard() {
        let registry = address_registry();
        let rules = infer(
            &registry,
            &TypeRef::input("AddressInput").non_null().list().non_null(),
            "addresses",
            &Arguments::new(),
        );
        assert_eq!(
            rules,
            rule_set(&[
                ("addresses.*.city", "required"),
                ("addresses.*.zip", "size:5"),
            ])
        );
    }

    #[test]
    fn nested_list_adds_single_wildcard() {
        let registry = address_registry();
        let rules = infer(
            &registry,
            &TypeRef::input("AddressInput").list().list(),
            "grid",
            &Arguments::new(),
        );
        assert_eq!(
            rules.keys().collect::<Vec<_>>(),
            vec!["grid.*.city", "grid.*.zip"]
        );
    }

    #[test]
    fn is_idempotent() {
        let registry = address_registry();
        let ty = TypeRef::input("PersonInput").list();
        let args = Arguments::new();
        assert_eq!(
            infer(&registry, &ty, "people", &args),
            infer(&registry, &ty, "people", &args)
        );
    }

    #[test]
    fn self_reference_terminates() {
        let mut registry = TypeRegistry::default();
        registry
            .register_input(
                InputObjectType::new("CategoryInput")
                    .field(InputField::new("name", TypeRef::scalar("String")).rules("required"))
                    .field(
                        InputField::new("parent", TypeRef::input("CategoryInput"))
                            .rules("nullable"),
                    )
                    .field(InputField::new(
                        "children",
                        TypeRef::input("CategoryInput").non_null().list(),
                    )),
            )
            .unwrap();

        let rules = infer(&registry, &TypeRef::input("CategoryInput"), "category", &Arguments::new());
        assert_eq!(
            rules,
            rule_set(&[("category.name", "required"), ("category.parent", "nullable")])
        );

        let input = registry.input_object("CategoryInput").unwrap();
        let (root, args) = (ConstValue::Null, Arguments::new());
        let resolve_args = ResolveArgs::new(&root, &args, &(), None);
        let rules = RuleInferer::new(&registry).input_type_rules(input, "category", &resolve_args);
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn mutual_reference_terminates() {
        let mut registry = TypeRegistry::default();
        registry
            .register_input(
                InputObjectType::new("AuthorInput")
                    .field(InputField::new("name", TypeRef::scalar("String")).rules("required"))
                    .field(InputField::new("books", TypeRef::input("BookInput").list())),
            )
            .unwrap();
        registry
            .register_input(
                InputObjectType::new("BookInput")
                    .field(InputField::new("title", TypeRef::scalar("String")).rules("required"))
                    .field(InputField::new("author", TypeRef::input("AuthorInput")).rules("array")),
            )
            .unwrap();

        let rules = infer(&registry, &TypeRef::input("AuthorInput"), "author", &Arguments::new());
        assert_eq!(
            rules,
            rule_set(&[
                ("author.name", "required"),
                ("author.books.*.title", "required"),
                ("author.books.*.author", "array"),
            ])
        );
    }

    #[test]
    fn same_type_in_siblings_is_expanded() {
        let mut registry = address_registry();
        registry
            .register_input(
                InputObjectType::new("ShipmentInput")
                    .field(InputField::new("from", TypeRef::input("AddressInput")))
                    .field(InputField::new("to", TypeRef::input("AddressInput").non_null())),
            )
            .unwrap();

        let rules = infer(&registry, &TypeRef::input("ShipmentInput"), "shipment", &Arguments::new());
        assert_eq!(
            rules.keys().collect::<Vec<_>>(),
            vec![
                "shipment.from.city",
                "shipment.from.zip",
                "shipment.to.city",
                "shipment.to.zip",
            ]
        );
    }

    #[test]
    fn computed_rules_see_arguments() {
        let mut registry = TypeRegistry::default();
        registry
            .register_input(InputObjectType::new("RangeInput").field(
                InputField::new("to", TypeRef::scalar("Int")).rules(Rule::computed(|args| {
                    match args.arg("from") {
                        Some(ConstValue::Number(from)) => format!("min:{}", from).into(),
                        _ => "integer".into(),
                    }
                })),
            ))
            .unwrap();

        let mut args = Arguments::new();
        args.insert(Name::new("from"), ConstValue::Number(7.into()));
        let rules = infer(&registry, &TypeRef::input("RangeInput"), "range", &args);
        assert_eq!(rules, rule_set(&[("range.to", "min:7")]));

        let rules = infer(&registry, &TypeRef::input("RangeInput"), "range", &Arguments::new());
        assert_eq!(rules, rule_set(&[("range.to", "integer")]));
    }

    #[test]
    fn unregistered_input_has_no_rules() {
        let registry = TypeRegistry::default();
        let rules = infer(&registry, &TypeRef::input("Missing"), "missing", &Arguments::new());
        assert!(rules.is_empty());
    }
}
