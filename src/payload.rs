//! The read-only key/value view of a decoded request body.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::PayloadError;

/// Decoded request body owned by a request object.
///
/// A `Payload` starts empty when its owner is constructed and is populated
/// exactly once, in a single assignment, with the full decoded body. After
/// that it is read-only: every accessor takes `&self` and none of them can
/// fail or panic.
///
/// # Examples
///
/// ```
/// use request_object::Payload;
/// use serde_json::json;
///
/// let payload = Payload::try_from(json!({"name": "Ann", "tags": ["a", "b"]})).unwrap();
///
/// assert!(payload.has("name"));
/// assert_eq!(payload.get("name"), Some(&json!("Ann")));
/// assert_eq!(payload.get_or("age", json!(0)), json!(0));
/// assert_eq!(payload.lookup("tags[1]"), Some(&json!("b")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
    assigned: bool,
}

impl Payload {
    /// Creates an empty, unassigned payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a payload that is already populated with `fields`.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            assigned: true,
        }
    }

    /// Populates the payload with the full decoded body.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::AlreadyAssigned`] if the payload was populated
    /// before. The existing contents are left untouched.
    pub(crate) fn assign(&mut self, fields: Map<String, Value>) -> Result<(), PayloadError> {
        if self.assigned {
            return Err(PayloadError::AlreadyAssigned);
        }
        self.fields = fields;
        self.assigned = true;
        Ok(())
    }

    /// Returns `true` once the body has been assigned.
    pub fn is_assigned(&self) -> bool {
        self.assigned
    }

    /// Returns the top-level value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns the value under `name`, or `default` when absent.
    pub fn get_or(&self, name: &str, default: Value) -> Value {
        self.fields.get(name).cloned().unwrap_or(default)
    }

    /// Returns the value under `name` converted to `T`.
    ///
    /// Yields `None` both when the field is absent and when it does not
    /// convert; use [`has`](Self::has) to tell those apart.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.fields
            .get(name)
            .and_then(|value| T::deserialize(value).ok())
    }

    /// Returns `true` if a top-level field named `name` is present.
    ///
    /// A field holding `null` is present.
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the whole mapping.
    pub fn all(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns the top-level field names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolves a nested field by dot/bracket path, e.g. `address.city` or
    /// `items[0].sku`.
    ///
    /// Malformed paths resolve to `None`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let segments = parse_path(path)?;
        let mut iter = segments.into_iter();
        let mut current = match iter.next()? {
            Segment::Key(key) => self.fields.get(key)?,
            Segment::Index(_) => return None,
        };
        for segment in iter {
            current = match segment {
                Segment::Key(key) => current.as_object()?.get(key)?,
                Segment::Index(index) => current.as_array()?.get(index)?,
            };
        }
        Some(current)
    }

    /// Deserializes the whole payload into a typed value.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the payload does not match `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(Value::Object(self.fields.clone()))
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_map(fields)
    }
}

impl TryFrom<Value> for Payload {
    type Error = PayloadError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self::from_map(fields)),
            other => Err(PayloadError::NotAnObject(json_kind(&other))),
        }
    }
}

/// Returns a short name for the JSON kind of `value`.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

fn parse_path(path: &str) -> Option<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        let (key, mut rest) = match part.find('[') {
            Some(at) => (&part[..at], &part[at..]),
            None => (part, ""),
        };
        if !key.is_empty() {
            segments.push(Segment::Key(key));
        } else if rest.is_empty() {
            return None;
        }
        while !rest.is_empty() {
            if !rest.starts_with('[') {
                return None;
            }
            let close = rest.find(']')?;
            segments.push(Segment::Index(rest[1..close].parse().ok()?));
            rest = &rest[close + 1..];
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}
