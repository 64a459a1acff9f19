mod error;
mod registry;
mod type_ref;

pub use error::SchemaError;
pub use registry::{
    Argument, InputField, InputObjectType, ObjectField, ObjectType, Privacy, TypeRegistry,
};
pub use type_ref::{NamedKind, TypeRef};
