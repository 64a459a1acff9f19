mod args;
mod definition;
mod error;
mod inferer;
mod select_fields;

pub use args::{Arguments, Context, ResolveArgs, ResolveInfo};
pub use definition::{Field, FieldDefinition, FieldDescription, Resolvable, Resolver};
pub use error::FieldError;
pub use inferer::RuleInferer;
pub use select_fields::{SelectFields, SelectFieldsFactory, DEFAULT_DEPTH};
