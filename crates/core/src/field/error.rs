use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("validation")]
    Validation(ValidationErrors),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Resolve(anyhow::Error),
}

impl FieldError {
    pub fn category(&self) -> &'static str {
        match self {
            FieldError::Validation(_) => "validation",
            FieldError::Unauthorized => "authorization",
            FieldError::Resolve(_) => "internal",
        }
    }
}
