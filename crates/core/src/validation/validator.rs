use indexmap::IndexMap;
use value::ConstValue;

use super::constraint::Constraint;
use super::{RuleSet, ValidationErrors};
use crate::field::Arguments;

/// Custom messages, keyed by `<attribute>.<rule>`, `<pattern>.<rule>` or `<rule>`.
pub type Messages = IndexMap<String, String>;

/// Checks submitted argument values against a rule set.
pub trait Validator: Send + Sync {
    fn validate(
        &self,
        values: &Arguments,
        rules: &RuleSet,
        messages: &Messages,
    ) -> Result<(), ValidationErrors>;
}

/// The built-in validator for `required|min:3` style rules.
#[derive(Debug, Default, Copy, Clone)]
pub struct RuleValidator;

impl Validator for RuleValidator {
    fn validate(
        &self,
        values: &Arguments,
        rules: &RuleSet,
        messages: &Messages,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for (pattern, rule) in rules {
            let constraints = rule
                .constraints()
                .into_iter()
                .filter_map(|constraint| match constraint.parse::<Constraint>() {
                    Ok(constraint) => Some(constraint),
                    Err(err) => {
                        tracing::warn!(key = %pattern, error = %err, "Ignoring validation rule.");
                        None
                    }
                })
                .collect::<Vec<_>>();

            for (key, value) in expand_key(pattern, values) {
                validate_attribute(&key, value, &constraints, messages, &mut errors);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn validate_attribute(
    key: &str,
    value: Option<&ConstValue>,
    constraints: &[Constraint],
    messages: &Messages,
    errors: &mut ValidationErrors,
) {
    let has = |modifier: Constraint| constraints.iter().any(|constraint| *constraint == modifier);
    if value.is_none() && has(Constraint::Sometimes) {
        return;
    }
    let bail = has(Constraint::Bail);
    let nullable = has(Constraint::Nullable);

    let is_blank = match value {
        None => true,
        Some(ConstValue::String(s)) => s.trim().is_empty(),
        Some(ConstValue::Null) => nullable,
        _ => false,
    };

    for constraint in constraints.iter().filter(|constraint| !constraint.is_modifier()) {
        if is_blank && !constraint.is_implicit() {
            continue;
        }
        if constraint.check(value) {
            continue;
        }
        errors.add(key, message(key, constraint, value, messages));
        if bail || constraint.is_implicit() {
            break;
        }
    }
}

/// Expand a rule key against the submitted values.
///
/// A `*` segment yields every element present at that position; a named
/// segment yields the (possibly absent) child.
fn expand_key<'a>(pattern: &str, values: &'a Arguments) -> Vec<(String, Option<&'a ConstValue>)> {
    fn walk<'a>(
        segments: &[&str],
        path: String,
        value: Option<&'a ConstValue>,
        out: &mut Vec<(String, Option<&'a ConstValue>)>,
    ) {
        match segments.split_first() {
            None => out.push((path, value)),
            Some((&"*", rest)) => match value {
                Some(ConstValue::List(items)) => {
                    for (idx, item) in items.iter().enumerate() {
                        walk(rest, format!("{}.{}", path, idx), Some(item), out);
                    }
                }
                Some(ConstValue::Object(obj)) => {
                    for (name, item) in obj {
                        walk(rest, format!("{}.{}", path, name), Some(item), out);
                    }
                }
                _ => {}
            },
            Some((name, rest)) => {
                let child = match value {
                    Some(ConstValue::Object(obj)) => obj.get(*name),
                    Some(ConstValue::List(items)) => {
                        name.parse::<usize>().ok().and_then(|idx| items.get(idx))
                    }
                    _ => None,
                };
                walk(rest, format!("{}.{}", path, name), child, out);
            }
        }
    }

    let segments = pattern.split('.').collect::<Vec<_>>();
    let mut out = Vec::new();
    match segments.split_first() {
        Some((&"*", rest)) => {
            for (name, value) in values {
                walk(rest, name.to_string(), Some(value), &mut out);
            }
        }
        Some((name, rest)) => walk(rest, name.to_string(), values.get(*name), &mut out),
        None => {}
    }
    out
}

fn wildcard_matches(pattern: &str, key: &str) -> bool {
    let pattern = pattern.split('.').collect::<Vec<_>>();
    let key = key.split('.').collect::<Vec<_>>();
    pattern.len() == key.len()
        && pattern
            .iter()
            .zip(&key)
            .all(|(pattern, segment)| *pattern == "*" || pattern == segment)
}

fn message(
    key: &str,
    constraint: &Constraint,
    value: Option<&ConstValue>,
    messages: &Messages,
) -> String {
    let rule = constraint.name();
    let rule_key = format!("{}.{}", key, rule);
    let template = messages
        .get(&rule_key)
        .or_else(|| {
            messages
                .iter()
                .find(|(pattern, _)| pattern.contains('*') && wildcard_matches(pattern, &rule_key))
                .map(|(_, message)| message)
        })
        .or_else(|| messages.get(rule))
        .cloned()
        .unwrap_or_else(|| default_message(constraint, value).to_string());

    let mut message = template.replace(":attribute", &key.replace('_', " "));
    match constraint {
        Constraint::Min(min) => message = message.replace(":min", &format_number(*min)),
        Constraint::Max(max) => message = message.replace(":max", &format_number(*max)),
        Constraint::Size(size) => message = message.replace(":size", &format_number(*size)),
        Constraint::Between(min, max) => {
            message = message
                .replace(":min", &format_number(*min))
                .replace(":max", &format_number(*max))
        }
        Constraint::In(values) | Constraint::NotIn(values) => {
            message = message.replace(":values", &values.join(", "))
        }
        _ => {}
    }
    message
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

enum SizeKind {
    Numeric,
    Array,
    String,
}

fn default_message(constraint: &Constraint, value: Option<&ConstValue>) -> &'static str {
    let kind = match value {
        Some(ConstValue::Number(_)) => SizeKind::Numeric,
        Some(ConstValue::List(_)) | Some(ConstValue::Object(_)) => SizeKind::Array,
        _ => SizeKind::String,
    };

    match (constraint, kind) {
        (Constraint::Required, _) => "The :attribute field is required.",
        (Constraint::Filled, _) => "The :attribute field must have a value.",
        (Constraint::Present, _) => "The :attribute field must be present.",
        (Constraint::Accepted, _) => "The :attribute must be accepted.",
        (Constraint::String, _) => "The :attribute must be a string.",
        (Constraint::Integer, _) => "The :attribute must be an integer.",
        (Constraint::Numeric, _) => "The :attribute must be a number.",
        (Constraint::Boolean, _) => "The :attribute field must be true or false.",
        (Constraint::Array, _) => "The :attribute must be an array.",
        (Constraint::Min(_), SizeKind::Numeric) => "The :attribute must be at least :min.",
        (Constraint::Min(_), SizeKind::Array) => "The :attribute must have at least :min items.",
        (Constraint::Min(_), SizeKind::String) => {
            "The :attribute must be at least :min characters."
        }
        (Constraint::Max(_), SizeKind::Numeric) => "The :attribute may not be greater than :max.",
        (Constraint::Max(_), SizeKind::Array) => {
            "The :attribute may not have more than :max items."
        }
        (Constraint::Max(_), SizeKind::String) => {
            "The :attribute may not be greater than :max characters."
        }
        (Constraint::Between(_, _), SizeKind::Numeric) => {
            "The :attribute must be between :min and :max."
        }
        (Constraint::Between(_, _), SizeKind::Array) => {
            "The :attribute must have between :min and :max items."
        }
        (Constraint::Between(_, _), SizeKind::String) => {
            "The :attribute must be between :min and :max characters."
        }
        (Constraint::Size(_), SizeKind::Numeric) => "The :attribute must be :size.",
        (Constraint::Size(_), SizeKind::Array) => "The :attribute must contain :size items.",
        (Constraint::Size(_), SizeKind::String) => "The :attribute must be :size characters.",
        (Constraint::In(_), _) | (Constraint::NotIn(_), _) => "The selected :attribute is invalid.",
        (Constraint::Email, _) => "The :attribute must be a valid email address.",
        (Constraint::Alpha, _) => "The :attribute may only contain letters.",
        (Constraint::AlphaNum, _) => "The :attribute may only contain letters and numbers.",
        (Constraint::AlphaDash, _) => {
            "The :attribute may only contain letters, numbers, dashes and underscores."
        }
        (Constraint::Bail, _) | (Constraint::Sometimes, _) | (Constraint::Nullable, _) => {
            "The :attribute is invalid."
        }
    }
}
