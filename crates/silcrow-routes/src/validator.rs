/// Validator capability for dynamic path parameters
///
/// A validator receives the raw value of one dynamic segment (absent for an
/// unset optional catch-all) and returns the validated, possibly transformed,
/// value or a list of issues. Validation is synchronous by contract: a
/// validator that can only answer asynchronously reports
/// [`Validation::Pending`], which the router treats as an integration defect.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::route::pattern::SegmentKind;
use crate::value::ParamValue;

/// One problem reported by a validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub message: String,
    /// Location inside the value (list index, nested key), if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

impl Issue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    /// Attaches a location to this issue
    pub fn at(mut self, segment: impl Into<String>) -> Self {
        self.path.push(segment.into());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{} (at {})", self.message, self.path.join("."))
        }
    }
}

/// Outcome of a validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Accepted; carries the value to use from here on
    Valid(Option<ParamValue>),
    /// Rejected with at least one issue
    Invalid(Vec<Issue>),
    /// The validator would complete asynchronously
    Pending,
}

impl Validation {
    /// Shorthand for a single-issue rejection
    pub fn invalid(message: impl Into<String>) -> Self {
        Validation::Invalid(vec![Issue::new(message)])
    }
}

/// Synchronous validator for one path parameter
pub trait Validator: Send + Sync {
    /// Validates (and optionally transforms) a raw parameter value
    fn validate(&self, raw: Option<&ParamValue>) -> Validation;

    /// Human readable description of what this validator expects
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl fmt::Debug for dyn Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({})", self.describe())
    }
}

/// Validators are shared between the tree and every resolved schema
pub type SharedValidator = Arc<dyn Validator>;

// ============================================================================
// Default validators
// ============================================================================

/// Accepts the raw value when its shape fits the segment kind
///
/// Used for dynamic segments declared without a validator:
/// `[id]` needs a string, `[...slug]` a non-empty list, `[[...slug]]` a
/// list or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeValidator {
    kind: SegmentKind,
}

impl ShapeValidator {
    pub fn for_kind(kind: SegmentKind) -> Self {
        Self { kind }
    }
}

impl Validator for ShapeValidator {
    fn validate(&self, raw: Option<&ParamValue>) -> Validation {
        check_shape(self.kind, raw)
            .map(|()| Validation::Valid(raw.cloned()))
            .unwrap_or_else(|issue| Validation::Invalid(vec![issue]))
    }

    fn describe(&self) -> String {
        match self.kind {
            SegmentKind::Dynamic => "string".to_string(),
            SegmentKind::CatchAll => "non-empty string list".to_string(),
            SegmentKind::OptionalCatchAll => "string list or nothing".to_string(),
            SegmentKind::Static | SegmentKind::Group => "no value".to_string(),
        }
    }
}

/// Checks that a value has the shape a segment kind expects
pub(crate) fn check_shape(kind: SegmentKind, value: Option<&ParamValue>) -> Result<(), Issue> {
    match (kind, value) {
        (SegmentKind::Dynamic, Some(ParamValue::Single(_))) => check_non_empty(value),
        (SegmentKind::Dynamic, Some(ParamValue::List(_))) => {
            Err(Issue::new("expected a single string, received a list"))
        }
        (SegmentKind::Dynamic, None) => Err(Issue::new("required parameter is missing")),
        (SegmentKind::CatchAll, Some(ParamValue::List(values))) if !values.is_empty() => {
            check_non_empty(value)
        }
        (SegmentKind::CatchAll, Some(ParamValue::List(_))) | (SegmentKind::CatchAll, None) => {
            Err(Issue::new("catch-all parameter needs at least one segment"))
        }
        (SegmentKind::CatchAll, Some(ParamValue::Single(_)))
        | (SegmentKind::OptionalCatchAll, Some(ParamValue::Single(_))) => {
            Err(Issue::new("expected a list of strings, received a single string"))
        }
        (SegmentKind::OptionalCatchAll, _) => check_non_empty(value),
        (SegmentKind::Static, _) | (SegmentKind::Group, _) => Ok(()),
    }
}

/// Rejects empty strings, which could never be matched back as a segment
pub(crate) fn check_non_empty(value: Option<&ParamValue>) -> Result<(), Issue> {
    match value {
        Some(ParamValue::Single(value)) if value.is_empty() => {
            Err(Issue::new("path segments cannot be empty"))
        }
        Some(ParamValue::List(values)) => match values.iter().position(String::is_empty) {
            Some(index) => Err(Issue::new("path segments cannot be empty").at(index.to_string())),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

// ============================================================================
// Closure validators
// ============================================================================

/// Validator backed by a closure
pub struct FnValidator<F> {
    description: String,
    validate: F,
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(Option<&ParamValue>) -> Validation + Send + Sync,
{
    fn validate(&self, raw: Option<&ParamValue>) -> Validation {
        (self.validate)(raw)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Wraps a closure as a shared validator
///
/// ```
/// use silcrow_routes::validator::{from_fn, Validation};
/// use silcrow_routes::Validator;
///
/// let even = from_fn("even length", |raw| match raw.and_then(|v| v.as_str()) {
///     Some(s) if s.len() % 2 == 0 => Validation::Valid(raw.cloned()),
///     _ => Validation::invalid("odd length"),
/// });
/// assert_eq!(even.describe(), "even length");
/// ```
pub fn from_fn<F>(description: impl Into<String>, validate: F) -> SharedValidator
where
    F: Fn(Option<&ParamValue>) -> Validation + Send + Sync + 'static,
{
    Arc::new(FnValidator {
        description: description.into(),
        validate,
    })
}

/// Validator that maps every string of the value through `transform`
///
/// Single values and each list element are transformed; an absent value is
/// rejected.
///
/// ```
/// use silcrow_routes::validator::map_string;
/// use silcrow_routes::{ParamValue, Validation, Validator};
///
/// let upper = map_string("uppercase string", |s| s.to_uppercase());
/// assert_eq!(
///     upper.validate(Some(&ParamValue::from("ab"))),
///     Validation::Valid(Some(ParamValue::from("AB")))
/// );
/// ```
pub fn map_string<F>(description: impl Into<String>, transform: F) -> SharedValidator
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    from_fn(description, move |raw| match raw {
        Some(ParamValue::Single(value)) => Validation::Valid(Some(ParamValue::Single(transform(value)))),
        Some(ParamValue::List(values)) => Validation::Valid(Some(ParamValue::List(
            values.iter().map(|value| transform(value)).collect(),
        ))),
        None => Validation::invalid("required parameter is missing"),
    })
}

// ============================================================================
// Parameter constraints
// ============================================================================

/// Common constraints for dynamic segment values
///
/// List values are accepted when every element satisfies the constraint.
///
/// ```
/// use silcrow_routes::{ParameterConstraint, ParamValue, Validator, Validation};
///
/// let int = ParameterConstraint::Int;
/// assert!(matches!(int.validate(Some(&ParamValue::from("-12"))), Validation::Valid(_)));
/// assert!(matches!(int.validate(Some(&ParamValue::from("1.5"))), Validation::Invalid(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterConstraint {
    /// Accepts any value of the right shape
    Any,
    /// Signed integer: `-12`, `0`, `42`
    Int,
    /// Unsigned integer: `0`, `42`
    UInt,
    /// ASCII letters only
    Alpha,
    /// ASCII letters and digits
    AlphaNum,
    /// Letters, digits, `-` and `_`
    Slug,
    /// UUID in any of the accepted textual forms
    Uuid,
}

impl ParameterConstraint {
    /// Parses a constraint name, unknown names map to `Any`
    ///
    /// ```
    /// use silcrow_routes::ParameterConstraint;
    ///
    /// assert_eq!(ParameterConstraint::from_name("integer"), ParameterConstraint::Int);
    /// assert_eq!(ParameterConstraint::from_name("whatever"), ParameterConstraint::Any);
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name {
            "int" | "integer" => ParameterConstraint::Int,
            "uint" | "unsigned" => ParameterConstraint::UInt,
            "alpha" => ParameterConstraint::Alpha,
            "alphanum" | "alnum" => ParameterConstraint::AlphaNum,
            "slug" => ParameterConstraint::Slug,
            "uuid" => ParameterConstraint::Uuid,
            _ => ParameterConstraint::Any,
        }
    }

    /// Checks a single string against this constraint
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ParameterConstraint::Any => true,
            ParameterConstraint::Int => value.parse::<i64>().is_ok(),
            ParameterConstraint::UInt => value.parse::<u64>().is_ok(),
            ParameterConstraint::Alpha => {
                !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
            }
            ParameterConstraint::AlphaNum => {
                !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
            }
            ParameterConstraint::Slug => {
                !value.is_empty()
                    && value
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            }
            ParameterConstraint::Uuid => uuid::Uuid::parse_str(value).is_ok(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ParameterConstraint::Any => "any",
            ParameterConstraint::Int => "int",
            ParameterConstraint::UInt => "uint",
            ParameterConstraint::Alpha => "alpha",
            ParameterConstraint::AlphaNum => "alphanum",
            ParameterConstraint::Slug => "slug",
            ParameterConstraint::Uuid => "uuid",
        }
    }
}

impl Validator for ParameterConstraint {
    fn validate(&self, raw: Option<&ParamValue>) -> Validation {
        match raw {
            Some(ParamValue::Single(value)) => {
                if self.accepts(value) {
                    Validation::Valid(raw.cloned())
                } else {
                    Validation::invalid(format!("'{}' is not a valid {}", value, self.name()))
                }
            }
            Some(ParamValue::List(values)) => {
                let issues: Vec<Issue> = values
                    .iter()
                    .enumerate()
                    .filter(|(_, value)| !self.accepts(value))
                    .map(|(index, value)| {
                        Issue::new(format!("'{}' is not a valid {}", value, self.name()))
                            .at(index.to_string())
                    })
                    .collect();
                if issues.is_empty() {
                    Validation::Valid(raw.cloned())
                } else {
                    Validation::Invalid(issues)
                }
            }
            None => Validation::invalid("required parameter is missing"),
        }
    }

    fn describe(&self) -> String {
        self.name().to_string()
    }
}

/// Validator matching every string of the value against a regular expression
///
/// The expression must match the whole value.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    regex: Regex,
}

impl PatternValidator {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let anchored = format!("^(?:{})$", pattern);
        Ok(Self {
            regex: Regex::new(&anchored)?,
        })
    }
}

impl Validator for PatternValidator {
    fn validate(&self, raw: Option<&ParamValue>) -> Validation {
        let values: Vec<&String> = match raw {
            Some(ParamValue::Single(value)) => vec![value],
            Some(ParamValue::List(values)) => values.iter().collect(),
            None => return Validation::invalid("required parameter is missing"),
        };

        match values.iter().find(|value| !self.regex.is_match(value)) {
            Some(value) => Validation::invalid(format!(
                "'{}' does not match {}",
                value,
                self.regex.as_str()
            )),
            None => Validation::Valid(raw.cloned()),
        }
    }

    fn describe(&self) -> String {
        format!("pattern {}", self.regex.as_str())
    }
}
