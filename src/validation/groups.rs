//! Validation group selection.

use std::borrow::Cow;
use std::fmt;

/// Name of the group a constraint belongs to when none is given.
pub const DEFAULT_GROUP: &str = "Default";

/// A non-empty, ordered set of validation group names.
///
/// Request objects return `Groups` from
/// [`validation_groups`](crate::RequestObject::validation_groups) to switch
/// which constraints apply, e.g. "if `type` is `company`, validate the
/// `Company` group".
///
/// # Examples
///
/// ```
/// use request_object::validation::{Groups, DEFAULT_GROUP};
///
/// let groups = Groups::from(["Default", "Company"]);
/// assert!(groups.contains("Company"));
/// assert!(Groups::default().contains(DEFAULT_GROUP));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Groups {
    names: Vec<Cow<'static, str>>,
}

impl Groups {
    /// Creates a selection from group names, dropping duplicates.
    ///
    /// An empty input falls back to the default group.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        let mut unique: Vec<Cow<'static, str>> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        if unique.is_empty() {
            return Self::default_group();
        }
        Self { names: unique }
    }

    /// Returns the selection holding only the default group.
    pub fn default_group() -> Self {
        Self {
            names: vec![Cow::Borrowed(DEFAULT_GROUP)],
        }
    }

    /// Returns `true` if `name` is selected.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.as_ref() == name)
    }

    /// Iterates the selected group names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.as_ref())
    }
}

impl Default for Groups {
    fn default() -> Self {
        Self::default_group()
    }
}

impl fmt::Display for Groups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(", "))
    }
}

impl From<&'static str> for Groups {
    fn from(name: &'static str) -> Self {
        Self::new([name])
    }
}

impl From<String> for Groups {
    fn from(name: String) -> Self {
        Self::new([name])
    }
}

impl<const N: usize> From<[&'static str; N]> for Groups {
    fn from(names: [&'static str; N]) -> Self {
        Self::new(names)
    }
}

impl From<Vec<String>> for Groups {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}
