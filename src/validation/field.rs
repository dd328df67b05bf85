//! Built-in per-field rules.

use std::fmt;

use serde_json::Value;

use super::{Constraint, Groups};
use crate::error::Fault;
use crate::payload::Payload;
use crate::violation::Violations;

const MISSING: &str = "This field is missing.";
const NOT_BLANK: &str = "This value should not be blank.";
const NOT_A_NUMBER: &str = "This value should be a valid number.";
const INVALID_CHOICE: &str = "The value you selected is not a valid choice.";

/// JSON value kinds a field can be required to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    /// A JSON string
    String,
    /// A JSON number without a fractional part
    Integer,
    /// Any JSON number
    Number,
    /// `true` or `false`
    Boolean,
    /// A JSON array
    Array,
    /// A JSON object
    Object,
}

impl JsonType {
    /// Returns `true` if `value` is of this kind.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            JsonType::String => value.is_string(),
            JsonType::Integer => value.is_i64() || value.is_u64(),
            JsonType::Number => value.is_number(),
            JsonType::Boolean => value.is_boolean(),
            JsonType::Array => value.is_array(),
            JsonType::Object => value.is_object(),
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonType::String => write!(f, "string"),
            JsonType::Integer => write!(f, "int"),
            JsonType::Number => write!(f, "number"),
            JsonType::Boolean => write!(f, "bool"),
            JsonType::Array => write!(f, "array"),
            JsonType::Object => write!(f, "object"),
        }
    }
}

/// One check applied to a present field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// The value must be of the given kind. A failed type check stops the
    /// remaining checks for that field.
    Type(JsonType),
    /// The value must not be `null`, `false`, an empty string or an empty array.
    NotBlank,
    /// Numeric lower bound, inclusive.
    Min(f64),
    /// Numeric upper bound, inclusive.
    Max(f64),
    /// Character-count bounds for strings, inclusive.
    Length {
        /// Minimum number of characters
        min: Option<usize>,
        /// Maximum number of characters
        max: Option<usize>,
    },
    /// The value must equal one of the listed values.
    OneOf(Vec<Value>),
}

impl Check {
    /// Evaluates the check, returning the violation message on failure.
    fn evaluate(&self, value: &Value) -> Option<String> {
        match self {
            Check::Type(kind) => {
                (!kind.matches(value)).then(|| format!("This value should be of type {}.", kind))
            }
            Check::NotBlank => is_blank(value).then(|| NOT_BLANK.to_string()),
            Check::Min(min) => match value.as_f64() {
                None => Some(NOT_A_NUMBER.to_string()),
                Some(n) if n < *min => Some(format!(
                    "This value should be greater than or equal to {}.",
                    min
                )),
                Some(_) => None,
            },
            Check::Max(max) => match value.as_f64() {
                None => Some(NOT_A_NUMBER.to_string()),
                Some(n) if n > *max => Some(format!(
                    "This value should be less than or equal to {}.",
                    max
                )),
                Some(_) => None,
            },
            Check::Length { min, max } => {
                let Some(text) = value.as_str() else {
                    return Some(format!("This value should be of type {}.", JsonType::String));
                };
                let count = text.chars().count();
                match (min, max) {
                    (Some(min), _) if count < *min => Some(format!(
                        "This value is too short. It should have {} characters or more.",
                        min
                    )),
                    (_, Some(max)) if count > *max => Some(format!(
                        "This value is too long. It should have {} characters or less.",
                        max
                    )),
                    _ => None,
                }
            }
            Check::OneOf(choices) => (!choices.contains(value)).then(|| INVALID_CHOICE.to_string()),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Rules for one field of the payload, addressed by dot/bracket path.
///
/// Fields are optional unless marked [`required`](Self::required): an absent
/// optional field produces no violations. Checks run in the order they were
/// added.
///
/// # Examples
///
/// ```
/// use request_object::validation::{Constraint, Field};
/// use request_object::{Payload, Violations};
/// use serde_json::json;
///
/// let age = Field::new("age").required().integer().min(0.0);
///
/// let payload = Payload::try_from(json!({"age": -5})).unwrap();
/// let mut violations = Violations::new();
/// age.check(&payload, &mut violations).unwrap();
///
/// assert_eq!(
///     violations.as_slice()[0].message(),
///     "This value should be greater than or equal to 0."
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    path: String,
    required: bool,
    checks: Vec<Check>,
    groups: Groups,
}

impl Field {
    /// Starts rules for the field at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required: false,
            checks: Vec::new(),
            groups: Groups::default_group(),
        }
    }

    /// Requires the field to be present.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Adds an arbitrary check.
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Requires a value of the given kind.
    pub fn of_type(self, kind: JsonType) -> Self {
        self.with_check(Check::Type(kind))
    }

    /// Requires a string.
    pub fn string(self) -> Self {
        self.of_type(JsonType::String)
    }

    /// Requires an integer.
    pub fn integer(self) -> Self {
        self.of_type(JsonType::Integer)
    }

    /// Requires a number.
    pub fn number(self) -> Self {
        self.of_type(JsonType::Number)
    }

    /// Requires a boolean.
    pub fn boolean(self) -> Self {
        self.of_type(JsonType::Boolean)
    }

    /// Requires an array.
    pub fn array(self) -> Self {
        self.of_type(JsonType::Array)
    }

    /// Requires an object.
    pub fn object(self) -> Self {
        self.of_type(JsonType::Object)
    }

    /// Rejects blank values.
    pub fn not_blank(self) -> Self {
        self.with_check(Check::NotBlank)
    }

    /// Sets an inclusive numeric lower bound.
    pub fn min(self, min: f64) -> Self {
        self.with_check(Check::Min(min))
    }

    /// Sets an inclusive numeric upper bound.
    pub fn max(self, max: f64) -> Self {
        self.with_check(Check::Max(max))
    }

    /// Sets inclusive character-count bounds.
    pub fn length(self, min: Option<usize>, max: Option<usize>) -> Self {
        self.with_check(Check::Length { min, max })
    }

    /// Restricts the value to a fixed set of choices.
    pub fn one_of<I, V>(self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with_check(Check::OneOf(choices.into_iter().map(Into::into).collect()))
    }

    /// Moves the field's rules into the given groups.
    pub fn in_groups(mut self, groups: impl Into<Groups>) -> Self {
        self.groups = groups.into();
        self
    }

    /// Returns the field path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Constraint for Field {
    fn check(&self, payload: &Payload, violations: &mut Violations) -> Result<(), Fault> {
        let Some(value) = payload.lookup(&self.path) else {
            if self.required {
                violations.add(self.path.clone(), MISSING);
            }
            return Ok(());
        };

        for check in &self.checks {
            if let Some(message) = check.evaluate(value) {
                violations.add(self.path.clone(), message);
                if matches!(check, Check::Type(_)) {
                    break;
                }
            }
        }
        Ok(())
    }

    fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}
