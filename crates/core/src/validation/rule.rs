use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::field::ResolveArgs;

/// A literal rule: either a `|`-separated string or a list of constraints.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Single(String),
    List(Vec<String>),
}

impl RuleValue {
    /// The individual constraints, e.g. `["required", "min:3"]`.
    pub fn constraints(&self) -> Vec<&str> {
        match self {
            RuleValue::Single(rules) => rules
                .split('|')
                .map(str::trim)
                .filter(|rule| !rule.is_empty())
                .collect(),
            RuleValue::List(rules) => rules
                .iter()
                .map(|rule| rule.trim())
                .filter(|rule| !rule.is_empty())
                .collect(),
        }
    }
}

impl Display for RuleValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Single(rules) => write!(f, "{}", rules),
            RuleValue::List(rules) => write!(f, "{}", rules.join("|")),
        }
    }
}

impl From<&str> for RuleValue {
    fn from(rules: &str) -> Self {
        RuleValue::Single(rules.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(rules: String) -> Self {
        RuleValue::Single(rules)
    }
}

impl From<Vec<&str>> for RuleValue {
    fn from(rules: Vec<&str>) -> Self {
        RuleValue::List(rules.into_iter().map(ToString::to_string).collect())
    }
}

impl From<Vec<String>> for RuleValue {
    fn from(rules: Vec<String>) -> Self {
        RuleValue::List(rules)
    }
}

/// Validation rules keyed by dotted path, `*` standing for every list element.
pub type RuleSet = IndexMap<String, RuleValue>;

type ComputeRule = dyn Fn(&ResolveArgs<'_>) -> RuleValue + Send + Sync;

/// A rule declared on an argument or input field.
#[derive(Clone)]
pub enum Rule {
    Literal(RuleValue),
    /// Computed from the resolution arguments of each request.
    Computed(Arc<ComputeRule>),
}

impl Rule {
    pub fn computed(f: impl Fn(&ResolveArgs<'_>) -> RuleValue + Send + Sync + 'static) -> Self {
        Rule::Computed(Arc::new(f))
    }

    pub fn resolve(&self, args: &ResolveArgs<'_>) -> RuleValue {
        match self {
            Rule::Literal(value) => value.clone(),
            Rule::Computed(f) => f(args),
        }
    }
}

impl Debug for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Rule::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<RuleValue> for Rule {
    fn from(value: RuleValue) -> Self {
        Rule::Literal(value)
    }
}

impl From<&str> for Rule {
    fn from(rules: &str) -> Self {
        Rule::Literal(rules.into())
    }
}

impl From<String> for Rule {
    fn from(rules: String) -> Self {
        Rule::Literal(rules.into())
    }
}

impl From<Vec<&str>> for Rule {
    fn from(rules: Vec<&str>) -> Self {
        Rule::Literal(rules.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraints_of_pipe_string() {
        let rules = RuleValue::from("required| min:3 ||max:10");
        assert_eq!(rules.constraints(), vec!["required", "min:3", "max:10"]);
    }

    #[test]
    fn deserialize_string_or_list() {
        let single: RuleValue = serde_json::from_str(r#""required|email""#).unwrap();
        assert_eq!(single, RuleValue::from("required|email"));
        let list: RuleValue = serde_json::from_str(r#"["required", "in:a,b"]"#).unwrap();
        assert_eq!(list.constraints(), vec!["required", "in:a,b"]);
        assert_eq!(list.to_string(), "required|in:a,b");
    }
}
