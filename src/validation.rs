//! Rule evaluation: constraints, validation groups and the engine seam.
//!
//! This module provides:
//! - `Constraint`: one rule, evaluated against a payload
//! - `Ruleset`: the rules a request object declares (possibly none)
//! - `Groups`: the validation groups a request object selects
//! - `ValidationEngine`: the pluggable engine the binder calls
//! - `Field` and `Callback`: a small built-in rule vocabulary
//!
//! The binder never interprets rules itself. It asks the request object for
//! its ruleset and groups and hands both to the engine.

mod constraint;
mod engine;
mod field;
mod groups;

pub use constraint::{Callback, Constraint, Rule, Ruleset};
pub use engine::{ConstraintEngine, ValidationEngine};
pub use field::{Check, Field, JsonType};
pub use groups::{Groups, DEFAULT_GROUP};
