use std::str::FromStr;

use thiserror::Error;
use value::ConstValue;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConstraintError {
    #[error("Unknown validation rule '{rule}'.")]
    Unknown { rule: String },

    #[error("Validation rule '{rule}' expects {expected} parameter(s).")]
    Parameters { rule: String, expected: usize },

    #[error("Validation rule '{rule}' has a non-numeric parameter '{param}'.")]
    NotNumeric { rule: String, param: String },
}

/// One constraint out of a rule value, e.g. `min:3`.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Bail,
    Sometimes,
    Nullable,
    Required,
    Filled,
    Present,
    Accepted,
    String,
    Integer,
    Numeric,
    Boolean,
    Array,
    Min(f64),
    Max(f64),
    Between(f64, f64),
    Size(f64),
    In(Vec<String>),
    NotIn(Vec<String>),
    Email,
    Alpha,
    AlphaNum,
    AlphaDash,
}

impl FromStr for Constraint {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, params) = match s.split_once(':') {
            Some((name, params)) => (name.trim(), params.split(',').map(str::trim).collect()),
            None => (s.trim(), Vec::new()),
        };

        let number = |idx: usize| -> Result<f64, ConstraintError> {
            let param = params.get(idx).copied().unwrap_or_default();
            param.parse::<f64>().map_err(|_| ConstraintError::NotNumeric {
                rule: name.to_string(),
                param: param.to_string(),
            })
        };
        let arity = |expected: usize| -> Result<(), ConstraintError> {
            if params.len() != expected {
                return Err(ConstraintError::Parameters {
                    rule: name.to_string(),
                    expected,
                });
            }
            Ok(())
        };
        let values = || params.iter().map(ToString::to_string).collect::<Vec<_>>();

        let constraint = match name {
            "bail" => Constraint::Bail,
            "sometimes" => Constraint::Sometimes,
            "nullable" => Constraint::Nullable,
            "required" => Constraint::Required,
            "filled" => Constraint::Filled,
            "present" => Constraint::Present,
            "accepted" => Constraint::Accepted,
            "string" => Constraint::String,
            "integer" => Constraint::Integer,
            "numeric" => Constraint::Numeric,
            "boolean" => Constraint::Boolean,
            "array" => Constraint::Array,
            "email" => Constraint::Email,
            "alpha" => Constraint::Alpha,
            "alpha_num" => Constraint::AlphaNum,
            "alpha_dash" => Constraint::AlphaDash,
            "min" => {
                arity(1)?;
                Constraint::Min(number(0)?)
            }
            "max" => {
                arity(1)?;
                Constraint::Max(number(0)?)
            }
            "size" => {
                arity(1)?;
                Constraint::Size(number(0)?)
            }
            "between" => {
                arity(2)?;
                Constraint::Between(number(0)?, number(1)?)
            }
            "in" => Constraint::In(values()),
            "not_in" => Constraint::NotIn(values()),
            _ => {
                return Err(ConstraintError::Unknown {
                    rule: name.to_string(),
                })
            }
        };
        Ok(constraint)
    }
}

impl Constraint {
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::Bail => "bail",
            Constraint::Sometimes => "sometimes",
            Constraint::Nullable => "nullable",
            Constraint::Required => "required",
            Constraint::Filled => "filled",
            Constraint::Present => "present",
            Constraint::Accepted => "accepted",
            Constraint::String => "string",
            Constraint::Integer => "integer",
            Constraint::Numeric => "numeric",
            Constraint::Boolean => "boolean",
            Constraint::Array => "array",
            Constraint::Min(_) => "min",
            Constraint::Max(_) => "max",
            Constraint::Between(_, _) => "between",
            Constraint::Size(_) => "size",
            Constraint::In(_) => "in",
            Constraint::NotIn(_) => "not_in",
            Constraint::Email => "email",
            Constraint::Alpha => "alpha",
            Constraint::AlphaNum => "alpha_num",
            Constraint::AlphaDash => "alpha_dash",
        }
    }

    /// Modifiers change how the other constraints run and never fail.
    #[inline]
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Constraint::Bail | Constraint::Sometimes | Constraint::Nullable
        )
    }

    /// Implicit constraints also run when the attribute is absent.
    #[inline]
    pub fn is_implicit(&self) -> bool {
        matches!(
            self,
            Constraint::Required | Constraint::Filled | Constraint::Present | Constraint::Accepted
        )
    }

    /// `None` means the attribute is absent from the submitted values.
    pub fn check(&self, value: Option<&ConstValue>) -> bool {
        match self {
            Constraint::Bail | Constraint::Sometimes | Constraint::Nullable => true,
            Constraint::Required => value.map_or(false, has_value),
            Constraint::Filled => value.map_or(true, has_value),
            Constraint::Present => value.is_some(),
            Constraint::Accepted => value
                .and_then(scalar_text)
                .map_or(false, |text| matches!(text.as_str(), "yes" | "on" | "1" | "true")),
            Constraint::String => {
                matches!(value, Some(ConstValue::String(_)) | Some(ConstValue::Enum(_)))
            }
            Constraint::Integer => match value {
                Some(ConstValue::Number(n)) => n.is_i64() || n.is_u64(),
                Some(ConstValue::String(s)) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            Constraint::Numeric => match value {
                Some(ConstValue::Number(_)) => true,
                Some(ConstValue::String(s)) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            Constraint::Boolean => match value {
                Some(ConstValue::Boolean(_)) => true,
                Some(ConstValue::Number(n)) => matches!(n.as_i64(), Some(0) | Some(1)),
                Some(ConstValue::String(s)) => matches!(s.as_str(), "0" | "1"),
                _ => false,
            },
            Constraint::Array => {
                matches!(value, Some(ConstValue::List(_)) | Some(ConstValue::Object(_)))
            }
            Constraint::Min(min) => value.and_then(size_of).map_or(false, |size| size >= *min),
            Constraint::Max(max) => value.and_then(size_of).map_or(false, |size| size <= *max),
            Constraint::Between(min, max) => value
                .and_then(size_of)
                .map_or(false, |size| size >= *min && size <= *max),
            Constraint::Size(expected) => value
                .and_then(size_of)
                .map_or(false, |size| (size - *expected).abs() < f64::EPSILON),
            Constraint::In(values) => value.map_or(false, |value| is_in(value, values)),
            Constraint::NotIn(values) => value.map_or(false, |value| match value {
                ConstValue::List(items) => items.iter().all(|item| !is_in(item, values)),
                value => scalar_text(value).map_or(false, |text| !values.contains(&text)),
            }),
            Constraint::Email => match value {
                Some(ConstValue::String(s)) => is_email(s),
                _ => false,
            },
            Constraint::Alpha => match value {
                Some(ConstValue::String(s)) => !s.is_empty() && s.chars().all(char::is_alphabetic),
                _ => false,
            },
            Constraint::AlphaNum => value.and_then(scalar_text).map_or(false, |s| {
                !s.is_empty() && s.chars().all(char::is_alphanumeric)
            }),
            Constraint::AlphaDash => value.and_then(scalar_text).map_or(false, |s| {
                !s.is_empty()
                    && s
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
            }),
        }
    }
}

fn has_value(value: &ConstValue) -> bool {
    match value {
        ConstValue::Null => false,
        ConstValue::String(s) => !s.trim().is_empty(),
        ConstValue::List(items) => !items.is_empty(),
        ConstValue::Object(obj) => !obj.is_empty(),
        _ => true,
    }
}

/// Strings count characters, numbers their value, lists and objects their elements.
pub(crate) fn size_of(value: &ConstValue) -> Option<f64> {
    match value {
        ConstValue::String(s) => Some(s.chars().count() as f64),
        ConstValue::Enum(name) => Some(name.chars().count() as f64),
        ConstValue::Number(n) => n.as_f64(),
        ConstValue::List(items) => Some(items.len() as f64),
        ConstValue::Object(obj) => Some(obj.len() as f64),
        _ => None,
    }
}

fn scalar_text(value: &ConstValue) -> Option<String> {
    match value {
        ConstValue::String(s) => Some(s.clone()),
        ConstValue::Enum(name) => Some(name.to_string()),
        ConstValue::Number(n) => Some(n.to_string()),
        ConstValue::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_in(value: &ConstValue, values: &[String]) -> bool {
    match value {
        ConstValue::List(items) => items.iter().all(|item| is_in(item, values)),
        value => scalar_text(value).map_or(false, |text| values.contains(&text)),
    }
}

fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}
