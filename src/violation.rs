//! Validation results: ordered field-path → message violations.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single failed rule.
///
/// The path uses dot/bracket notation for nested fields (`address.city`,
/// `items[0].sku`). Serializes as a single-entry map `{ path: message }`.
///
/// # Examples
///
/// ```
/// use request_object::Violation;
///
/// let violation = Violation::new("name", "This field is missing.");
/// assert_eq!(violation.path(), "name");
/// assert_eq!(
///     serde_json::to_string(&violation).unwrap(),
///     r#"{"name":"This field is missing."}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    path: String,
    message: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the field path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.path, &self.message)?;
        map.end()
    }
}

/// The outcome of one validation run.
///
/// Violations keep the order in which the engine produced them; nothing here
/// sorts or merges them. An empty collection means validation succeeded.
///
/// # Examples
///
/// ```
/// use request_object::{Violation, Violations};
///
/// let mut violations = Violations::new();
/// assert!(violations.is_valid());
///
/// violations.push(Violation::new("age", "This value should be greater than or equal to 0."));
/// violations.push(Violation::new("age", "This value should be even."));
///
/// assert_eq!(violations.len(), 2);
/// assert_eq!(violations.for_path("age").count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    items: Vec<Violation>,
}

impl Violations {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation.
    pub fn push(&mut self, violation: Violation) {
        self.items.push(violation);
    }

    /// Appends a violation built from a path and message.
    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(Violation::new(path, message));
    }

    /// Returns `true` when there are no violations.
    pub fn is_valid(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` when there are no violations.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterates violations in engine order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.items.iter()
    }

    /// Iterates violations reported for `path`.
    pub fn for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.items.iter().filter(move |v| v.path == path)
    }

    /// Returns the violations as a slice.
    pub fn as_slice(&self) -> &[Violation] {
        &self.items
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl Serialize for Violations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl FromIterator<Violation> for Violations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<Violation> for Violations {
    fn extend<I: IntoIterator<Item = Violation>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_result_is_valid() {
        let violations = Violations::new();
        assert!(violations.is_valid());
        assert_eq!(violations.len(), 0);
        assert_eq!(violations.to_string(), "");
    }

    #[test]
    fn order_is_preserved() {
        let violations: Violations = vec![
            Violation::new("z", "last letter"),
            Violation::new("a", "first letter"),
            Violation::new("m", "middle"),
        ]
        .into_iter()
        .collect();

        let paths: Vec<&str> = violations.iter().map(Violation::path).collect();
        assert_eq!(paths, vec!["z", "a", "m"]);
    }

    #[test]
    fn duplicate_paths_are_not_merged() {
        let mut violations = Violations::new();
        violations.add("age", "too small");
        violations.add("age", "not even");

        assert_eq!(violations.len(), 2);
        assert_eq!(
            serde_json::to_value(&violations).unwrap(),
            json!([{"age": "too small"}, {"age": "not even"}])
        );
    }

    #[test]
    fn display_joins_entries() {
        let mut violations = Violations::new();
        violations.add("name", "missing");
        violations.add("age", "negative");
        assert_eq!(violations.to_string(), "name: missing; age: negative");
    }

    #[test]
    fn extend_appends_after_existing() {
        let mut violations = Violations::new();
        violations.add("first", "1");
        violations.extend(vec![Violation::new("second", "2")]);
        assert_eq!(violations.as_slice()[1].path(), "second");
    }
}
