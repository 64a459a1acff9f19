use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Type '{type_name}' definition conflicted.")]
    DefinitionConflicted { type_name: String },

    #[error("Unknown type '{type_name}'.")]
    UnknownType { type_name: String },

    #[error("Invalid type reference '{type_ref}'.")]
    InvalidTypeReference { type_ref: String },

    #[error("Field '{type_name}.{field_name}' must have an input type.")]
    NotAnInputType {
        type_name: String,
        field_name: String,
    },

    #[error("Field '{field_name}' has an invalid rule: {reason}")]
    InvalidRule { field_name: String, reason: String },
}
