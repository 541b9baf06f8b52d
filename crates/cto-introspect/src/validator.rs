//! # Field Validators
//!
//! Optional value constraints attached to primitive fields:
//!
//! - `range`: inclusive numeric bounds for `Integer`, `Long` and `Double`
//!   fields. Either bound may be omitted.
//! - `regex`: a pattern every `String` value must match.
//!
//! Validators run only after the value has passed the primitive type check,
//! so they never see a value of the wrong shape.

use std::fmt;

use cto_core::{PrimitiveType, ValidationError};
use regex::Regex;

/// A scalar handed to a [`FieldValidator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    /// Any numeric primitive, widened to `f64`.
    Number(f64),
    /// A `String` value.
    Text(&'a str),
}

/// A constraint on the values of a primitive field.
#[derive(Debug, Clone)]
pub enum FieldValidator {
    /// Inclusive numeric bounds.
    Range {
        lower: Option<f64>,
        upper: Option<f64>,
    },
    /// A regular expression the whole value is searched with.
    Pattern(Regex),
}

impl FieldValidator {
    /// Build a range validator.
    ///
    /// # Errors
    ///
    /// Returns a reason string if neither bound is given, a bound is not
    /// finite, or `lower > upper`.
    pub fn range(lower: Option<f64>, upper: Option<f64>) -> Result<Self, String> {
        if lower.is_none() && upper.is_none() {
            return Err("a range needs a lower or an upper bound".to_string());
        }
        if lower.into_iter().chain(upper).any(|b| !b.is_finite()) {
            return Err("range bounds must be finite numbers".to_string());
        }
        if let (Some(lo), Some(hi)) = (lower, upper) {
            if lo > hi {
                return Err(format!("lower bound {lo} is greater than upper bound {hi}"));
            }
        }
        Ok(FieldValidator::Range { lower, upper })
    }

    /// Build a pattern validator.
    ///
    /// # Errors
    ///
    /// Returns a reason string if the pattern does not compile.
    pub fn pattern(pattern: &str) -> Result<Self, String> {
        Regex::new(pattern)
            .map(FieldValidator::Pattern)
            .map_err(|e| format!("invalid regex {pattern:?}: {e}"))
    }

    /// Returns true if this validator may be attached to a field of `primitive` type.
    pub fn accepts(&self, primitive: PrimitiveType) -> bool {
        match self {
            FieldValidator::Range { .. } => primitive.is_numeric(),
            FieldValidator::Pattern(_) => primitive == PrimitiveType::String,
        }
    }

    /// Check a value of field `property` belonging to resource `resource_id`.
    ///
    /// A scalar of the kind the validator does not constrain (a number handed
    /// to a pattern, say) passes.
    pub fn validate(
        &self,
        resource_id: &str,
        property: &str,
        value: Scalar<'_>,
    ) -> Result<(), ValidationError> {
        let failure = match (self, value) {
            (FieldValidator::Range { lower, upper }, Scalar::Number(n)) => {
                if lower.is_some_and(|lo| n < lo) {
                    Some(format!("value {n} is outside lower bound {}", fmt_bound(*lower)))
                } else if upper.is_some_and(|hi| n > hi) {
                    Some(format!("value {n} is outside upper bound {}", fmt_bound(*upper)))
                } else {
                    None
                }
            }
            (FieldValidator::Pattern(regex), Scalar::Text(s)) => {
                if regex.is_match(s) {
                    None
                } else {
                    Some(format!(
                        "value {s:?} failed to match validation regex /{}/",
                        regex.as_str()
                    ))
                }
            }
            _ => None,
        };

        match failure {
            Some(message) => Err(ValidationError::ValidatorViolation {
                resource_id: resource_id.to_string(),
                property: property.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }
}

fn fmt_bound(bound: Option<f64>) -> String {
    bound.map(|b| b.to_string()).unwrap_or_default()
}

impl fmt::Display for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValidator::Range { lower, upper } => {
                write!(f, "range=[{},{}]", fmt_bound(*lower), fmt_bound(*upper))
            }
            FieldValidator::Pattern(regex) => write!(f, "regex=/{}/", regex.as_str()),
        }
    }
}
