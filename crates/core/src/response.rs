use std::collections::HashMap;

use parser::Pos;
use serde::{Deserialize, Serialize};
use value::ConstValue;

use crate::field::{FieldError, ResolveInfo};

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerError {
    pub message: String,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub path: Vec<ConstValue>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub locations: Vec<Pos>,

    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub extensions: HashMap<String, ConstValue>,
}

impl ServerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Default::default(),
            locations: Default::default(),
            extensions: Default::default(),
        }
    }

    /// Locate the error at the field being resolved.
    pub fn at(self, info: &ResolveInfo<'_>) -> Self {
        Self {
            path: vec![ConstValue::String(info.response_key().to_string())],
            locations: vec![info.field.pos],
            ..self
        }
    }
}

impl From<FieldError> for ServerError {
    fn from(err: FieldError) -> Self {
        let mut server_error = ServerError::new(err.to_string());
        server_error.extensions.insert(
            "category".to_string(),
            ConstValue::String(err.category().to_string()),
        );
        if let FieldError::Validation(errors) = err {
            server_error
                .extensions
                .insert("validation".to_string(), errors.into());
        }
        server_error
    }
}
