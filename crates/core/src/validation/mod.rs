mod constraint;
mod error;
mod rule;
mod validator;

pub use constraint::{Constraint, ConstraintError};
pub use error::ValidationErrors;
pub use rule::{Rule, RuleSet, RuleValue};
pub use validator::{Messages, RuleValidator, Validator};
