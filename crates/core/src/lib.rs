#![forbid(unsafe_code)]

mod config;
mod field;
mod response;
mod schema;
mod validation;

pub use config::{
    CompiledSchema, ConfiguredField, FieldConfig, InputFieldConfig, InputTypeConfig,
    ObjectFieldConfig, ObjectTypeConfig, SchemaConfig,
};
pub use field::{
    Arguments, Context, Field, FieldDefinition, FieldDescription, FieldError, Resolvable,
    ResolveArgs, ResolveInfo, Resolver, RuleInferer, SelectFields, SelectFieldsFactory,
    DEFAULT_DEPTH,
};
pub use response::ServerError;
pub use schema::{
    Argument, InputField, InputObjectType, NamedKind, ObjectField, ObjectType, Privacy,
    SchemaError, TypeRef, TypeRegistry,
};
pub use validation::{
    Constraint, ConstraintError, Messages, Rule, RuleSet, RuleValidator, RuleValue,
    ValidationErrors, Validator,
};
pub use value::{ConstValue, Name};
