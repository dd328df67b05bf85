use std::fmt;

use super::{Groups, DEFAULT_GROUP};
use crate::error::Fault;
use crate::payload::Payload;
use crate::violation::Violations;

/// A single validation rule.
///
/// Implementations inspect the payload and append violations in a stable
/// order. Returning `Err(Fault)` is reserved for unexpected failures (a
/// broken lookup table, an unavailable dependency); a rule that is merely
/// not satisfied must report a violation instead.
///
/// # Examples
///
/// ```
/// use request_object::validation::Constraint;
/// use request_object::{Fault, Payload, Violations};
///
/// #[derive(Debug)]
/// struct NoAdmins;
///
/// impl Constraint for NoAdmins {
///     fn check(&self, payload: &Payload, violations: &mut Violations) -> Result<(), Fault> {
///         if payload.get("role").and_then(|v| v.as_str()) == Some("admin") {
///             violations.add("role", "Admins cannot self-register.");
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Constraint: fmt::Debug + Send + Sync {
    /// Evaluates the rule, appending any violations.
    ///
    /// # Errors
    ///
    /// Returns a [`Fault`] only when the rule cannot be evaluated at all.
    fn check(&self, payload: &Payload, violations: &mut Violations) -> Result<(), Fault>;

    /// Returns `true` if the rule belongs to `group`.
    ///
    /// Rules belong to the default group unless they say otherwise.
    fn in_group(&self, group: &str) -> bool {
        group == DEFAULT_GROUP
    }
}

/// A boxed rule, as stored in a [`Ruleset`].
pub type Rule = Box<dyn Constraint>;

/// The rules a request object declares: none, one, or several.
///
/// An empty ruleset means the request object is always valid.
#[derive(Debug, Default)]
pub struct Ruleset {
    rules: Vec<Rule>,
}

impl Ruleset {
    /// Returns an empty ruleset.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns a ruleset holding a single rule.
    pub fn one(rule: impl Constraint + 'static) -> Self {
        Self::none().with(rule)
    }

    /// Adds a rule and returns the ruleset for chaining.
    pub fn with(mut self, rule: impl Constraint + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a rule in place.
    pub fn push(&mut self, rule: impl Constraint + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Returns `true` if no rules are declared.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Iterates the rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Constraint> {
        self.rules.iter().map(|rule| rule.as_ref())
    }
}

impl FromIterator<Rule> for Ruleset {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Rule>> for Ruleset {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

type CheckFn = dyn Fn(&Payload, &mut Violations) -> Result<(), Fault> + Send + Sync;

/// A rule backed by a closure, for one-off checks that do not warrant a type.
///
/// # Examples
///
/// ```
/// use request_object::validation::{Callback, Constraint};
/// use request_object::{Payload, Violations};
/// use serde_json::json;
///
/// let passwords_match = Callback::new(|payload, violations| {
///     if payload.get("password") != payload.get("password_confirmation") {
///         violations.add("password_confirmation", "Passwords do not match.");
///     }
///     Ok(())
/// });
///
/// let payload = Payload::try_from(json!({"password": "a", "password_confirmation": "b"})).unwrap();
/// let mut violations = Violations::new();
/// passwords_match.check(&payload, &mut violations).unwrap();
/// assert_eq!(violations.len(), 1);
/// ```
pub struct Callback {
    check: Box<CheckFn>,
    groups: Groups,
}

impl Callback {
    /// Wraps a closure as a default-group rule.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Payload, &mut Violations) -> Result<(), Fault> + Send + Sync + 'static,
    {
        Self {
            check: Box::new(check),
            groups: Groups::default_group(),
        }
    }

    /// Moves the rule into the given groups.
    pub fn in_groups(mut self, groups: impl Into<Groups>) -> Self {
        self.groups = groups.into();
        self
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl Constraint for Callback {
    fn check(&self, payload: &Payload, violations: &mut Violations) -> Result<(), Fault> {
        (self.check)(payload, violations)
    }

    fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn none_is_empty() {
        assert!(Ruleset::none().is_empty());
        assert_eq!(Ruleset::default().len(), 0);
    }

    #[test]
    fn with_keeps_declaration_order() {
        let rules = Ruleset::one(Callback::new(|_, v| {
            v.add("first", "1");
            Ok(())
        }))
        .with(Callback::new(|_, v| {
            v.add("second", "2");
            Ok(())
        }));

        let payload = Payload::new();
        let mut violations = Violations::new();
        for rule in rules.iter() {
            rule.check(&payload, &mut violations).unwrap();
        }

        let paths: Vec<&str> = violations.iter().map(|v| v.path()).collect();
        assert_eq!(paths, vec!["first", "second"]);
    }

    #[test]
    fn callback_group_membership() {
        let rule = Callback::new(|_, _| Ok(())).in_groups("Strict");
        assert!(rule.in_group("Strict"));
        assert!(!rule.in_group(DEFAULT_GROUP));
    }

    #[test]
    fn callback_can_fault() {
        let rule = Callback::new(|_, _| Err(Fault::new("lookup table missing")));
        let payload = Payload::try_from(json!({})).unwrap();
        let mut violations = Violations::new();

        let err = rule.check(&payload, &mut violations).unwrap_err();
        assert_eq!(err.message(), "lookup table missing");
        assert!(violations.is_empty());
    }
}
