use super::{Groups, Ruleset};
use crate::error::Fault;
use crate::payload::Payload;
use crate::violation::Violations;

/// The validation engine the binder delegates rule evaluation to.
///
/// The engine returns an explicit two-outcome result: `Ok` with the
/// (possibly empty) violations, or `Err` for a fault that prevented
/// evaluation. Violations must come back in the order they were produced.
///
/// Engines are shared by every request a binder handles, so they must be
/// `Send + Sync` and must not keep per-request state.
pub trait ValidationEngine: Send + Sync {
    /// Validates `payload` against the rules that belong to any of `groups`.
    ///
    /// # Errors
    ///
    /// Returns a [`Fault`] when evaluation itself fails.
    fn validate(
        &self,
        payload: &Payload,
        rules: &Ruleset,
        groups: &Groups,
    ) -> Result<Violations, Fault>;
}

/// The default engine: evaluates each [`Constraint`](super::Constraint) in
/// declaration order, skipping rules outside the selected groups.
///
/// # Examples
///
/// ```
/// use request_object::validation::{ConstraintEngine, Field, Groups, Ruleset, ValidationEngine};
/// use request_object::Payload;
/// use serde_json::json;
///
/// let rules = Ruleset::one(Field::new("name").required().string())
///     .with(Field::new("vat").required().in_groups("Company"));
///
/// let payload = Payload::try_from(json!({"name": "Acme"})).unwrap();
///
/// let default = ConstraintEngine.validate(&payload, &rules, &Groups::default()).unwrap();
/// assert!(default.is_valid());
///
/// let company = ConstraintEngine.validate(&payload, &rules, &Groups::from("Company")).unwrap();
/// assert_eq!(company.len(), 1);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstraintEngine;

impl ValidationEngine for ConstraintEngine {
    fn validate(
        &self,
        payload: &Payload,
        rules: &Ruleset,
        groups: &Groups,
    ) -> Result<Violations, Fault> {
        let mut violations = Violations::new();
        for rule in rules.iter() {
            if groups.iter().any(|group| rule.in_group(group)) {
                rule.check(payload, &mut violations)?;
            }
        }
        Ok(violations)
    }
}
