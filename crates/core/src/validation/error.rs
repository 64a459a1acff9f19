use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use value::{ConstValue, Name};

/// Validation messages per attribute key, in the order they were produced.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(message.into());
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(key, messages)| (key.as_str(), messages.as_slice()))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (idx, message) in self.0.values().flatten().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", message)?;
        }
        Ok(())
    }
}

impl From<ValidationErrors> for ConstValue {
    fn from(errors: ValidationErrors) -> Self {
        ConstValue::Object(
            errors
                .0
                .into_iter()
                .map(|(key, messages)| {
                    (
                        Name::new(key),
                        ConstValue::List(messages.into_iter().map(ConstValue::String).collect()),
                    )
                })
                .collect(),
        )
    }
}
