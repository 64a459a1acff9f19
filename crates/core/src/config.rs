use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use value::{ConstValue, Name};

use crate::field::{Arguments, Field, FieldDefinition};
use crate::schema::{
    Argument, InputField, InputObjectType, NamedKind, ObjectField, ObjectType, SchemaError,
    TypeRef, TypeRegistry,
};
use crate::validation::{Constraint, Messages, RuleSet, RuleValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scalars: Vec<String>,

    #[serde(default)]
    pub input_types: IndexMap<String, InputTypeConfig>,

    #[serde(default)]
    pub types: IndexMap<String, ObjectTypeConfig>,

    #[serde(default)]
    pub query: IndexMap<String, FieldConfig>,

    #[serde(default)]
    pub mutation: IndexMap<String, FieldConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputTypeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub fields: IndexMap<String, InputFieldConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFieldConfig {
    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<RuleValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub fields: IndexMap<String, ObjectFieldConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectFieldConfig {
    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    #[serde(default = "default_selectable")]
    pub selectable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub args: IndexMap<String, InputFieldConfig>,

    #[serde(default)]
    pub rules: IndexMap<String, RuleValue>,

    #[serde(default)]
    pub messages: Messages,
}

fn default_selectable() -> bool {
    true
}

/// A field declared in a [`SchemaConfig`]. It validates but does not resolve.
#[derive(Debug, Clone)]
pub struct ConfiguredField {
    description: Option<String>,
    ty: TypeRef,
    args: IndexMap<Name, Argument>,
    rules: RuleSet,
    messages: Messages,
}

impl Field for ConfiguredField {
    fn ty(&self) -> TypeRef {
        self.ty.clone()
    }

    fn attributes(&self) -> IndexMap<String, ConstValue> {
        let mut attributes = IndexMap::new();
        if let Some(description) = &self.description {
            attributes.insert(
                "description".to_string(),
                ConstValue::String(description.clone()),
            );
        }
        attributes
    }

    fn args(&self) -> IndexMap<Name, Argument> {
        self.args.clone()
    }

    fn rules(&self, _args: &Arguments) -> RuleSet {
        self.rules.clone()
    }

    fn validation_error_messages(&self, _args: &Arguments) -> Messages {
        self.messages.clone()
    }
}

pub struct CompiledSchema {
    pub registry: Arc<TypeRegistry>,
    pub query: IndexMap<Name, FieldDefinition<ConfiguredField>>,
    pub mutation: IndexMap<Name, FieldDefinition<ConfiguredField>>,
}

impl CompiledSchema {
    /// Look up `query.<name>`, `mutation.<name>`, or a bare name (queries first).
    pub fn field(&self, path: &str) -> Option<&FieldDefinition<ConfiguredField>> {
        match path.split_once('.') {
            Some(("query", name)) => self.query.get(name),
            Some(("mutation", name)) => self.mutation.get(name),
            Some(_) => None,
            None => self.query.get(path).or_else(|| self.mutation.get(path)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (String, &FieldDefinition<ConfiguredField>)> {
        self.query
            .iter()
            .map(|(name, field)| (format!("query.{}", name), field))
            .chain(
                self.mutation
                    .iter()
                    .map(|(name, field)| (format!("mutation.{}", name), field)),
            )
    }
}

impl SchemaConfig {
    pub fn build(&self) -> Result<CompiledSchema, SchemaError> {
        let mut registry = TypeRegistry::default();
        for scalar in &self.scalars {
            registry.register_scalar(scalar)?;
        }

        let kind_of = |name: &str| -> Option<NamedKind> {
            match registry.kind_of(name) {
                Some(kind) => Some(kind),
                None if self.input_types.contains_key(name) => Some(NamedKind::InputObject),
                None if self.types.contains_key(name) => Some(NamedKind::Object),
                None => None,
            }
        };

        let mut input_objects = Vec::new();
        for (type_name, config) in &self.input_types {
            let mut input = InputObjectType::new(type_name);
            input.description = config.description.clone();
            for (field_name, field) in &config.fields {
                let ty = parse_input_type(&field.ty, &kind_of, type_name, field_name)?;
                let mut input_field = InputField::new(field_name, ty);
                input_field.description = field.description.clone();
                if let Some(rules) = &field.rules {
                    check_rules(&format!("{}.{}", type_name, field_name), rules)?;
                    input_field = input_field.rules(rules.clone());
                }
                input = input.field(input_field);
            }
            input_objects.push(input);
        }

        let mut objects = Vec::new();
        for (type_name, config) in &self.types {
            let mut object = ObjectType::new(type_name);
            object.description = config.description.clone();
            for (field_name, field) in &config.fields {
                let ty = TypeRef::parse(&field.ty, &kind_of)?;
                let mut object_field =
                    ObjectField::new(field_name, ty).selectable(field.selectable);
                if let Some(column) = &field.column {
                    object_field = object_field.column(column.clone());
                }
                object = object.field(object_field);
            }
            objects.push(object);
        }

        let mut fields = Vec::new();
        for (operation, configs) in [("query", &self.query), ("mutation", &self.mutation)] {
            for (name, config) in configs {
                let field = configured_field(operation, name, config, &kind_of)?;
                fields.push((operation, name, field));
            }
        }

        for input in input_objects {
            registry.register_input(input)?;
        }
        for object in objects {
            registry.register_object(object)?;
        }

        let registry = Arc::new(registry);
        let mut query = IndexMap::new();
        let mut mutation = IndexMap::new();
        for (operation, name, field) in fields {
            let definition = FieldDefinition::new(field, registry.clone())
                .with_attribute("name", ConstValue::String(name.clone()));
            match operation {
                "query" => query.insert(Name::new(name), definition),
                _ => mutation.insert(Name::new(name), definition),
            };
        }

        Ok(CompiledSchema {
            registry,
            query,
            mutation,
        })
    }
}

fn parse_input_type(
    ty: &str,
    kind_of: &impl Fn(&str) -> Option<NamedKind>,
    type_name: &str,
    field_name: &str,
) -> Result<TypeRef, SchemaError> {
    let ty = TypeRef::parse(ty, kind_of)?;
    if let TypeRef::Object(_) = ty.concrete() {
        return Err(SchemaError::NotAnInputType {
            type_name: type_name.to_string(),
            field_name: field_name.to_string(),
        });
    }
    Ok(ty)
}

fn check_rules(owner: &str, rules: &RuleValue) -> Result<(), SchemaError> {
    for constraint in rules.constraints() {
        constraint
            .parse::<Constraint>()
            .map_err(|err| SchemaError::InvalidRule {
                field_name: owner.to_string(),
                reason: err.to_string(),
            })?;
    }
    Ok(())
}

fn configured_field(
    operation: &str,
    name: &str,
    config: &FieldConfig,
    kind_of: &impl Fn(&str) -> Option<NamedKind>,
) -> Result<ConfiguredField, SchemaError> {
    let mut args = IndexMap::new();
    for (arg_name, arg) in &config.args {
        let mut argument = Argument::new(parse_input_type(&arg.ty, kind_of, name, arg_name)?);
        argument.description = arg.description.clone();
        if let Some(rules) = &arg.rules {
            check_rules(&format!("{}.{}({})", operation, name, arg_name), rules)?;
            argument = argument.rules(rules.clone());
        }
        args.insert(Name::new(arg_name), argument);
    }

    for (key, rules) in &config.rules {
        check_rules(&format!("{}.{} {}", operation, name, key), rules)?;
    }

    Ok(ConfiguredField {
        description: config.description.clone(),
        ty: TypeRef::parse(&config.ty, kind_of)?,
        args,
        rules: config.rules.clone(),
        messages: config.messages.clone(),
    })
}
