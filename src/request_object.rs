//! The request object abstraction.

use std::any::Any;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::Fault;
use crate::payload::Payload;
use crate::validation::{Groups, Ruleset};

/// Upcasting to [`Any`] for request objects stored behind `dyn RequestObject`.
///
/// Implemented for every `'static` type; there is no need to implement it by hand.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Converts a boxed `self` into `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A typed, self-validating representation of a request payload.
///
/// A request object owns its [`Payload`], declares the rules it must satisfy
/// and, optionally, which validation groups apply for a given payload. The
/// [`Binder`](crate::Binder) constructs it, assigns the decoded body,
/// validates it and hands it to the handler.
///
/// Both [`rules`](Self::rules) and [`validation_groups`](Self::validation_groups)
/// must be free of side effects and must not assume that any validation has
/// already happened: the payload they see is the raw decoded body.
///
/// # Examples
///
/// ```
/// use request_object::validation::{Field, Groups, Ruleset};
/// use request_object::{Fault, Payload, RequestObject};
///
/// #[derive(Debug, Default)]
/// struct RegisterCustomer {
///     payload: Payload,
/// }
///
/// impl RequestObject for RegisterCustomer {
///     fn construct() -> Result<Self, Fault> {
///         Ok(Self::default())
///     }
///
///     fn payload(&self) -> &Payload {
///         &self.payload
///     }
///
///     fn payload_mut(&mut self) -> &mut Payload {
///         &mut self.payload
///     }
///
///     fn rules(&self) -> Ruleset {
///         Ruleset::one(Field::new("name").required().string())
///             .with(Field::new("vat_number").required().string().in_groups("Company"))
///     }
///
///     fn validation_groups(&self, payload: &Payload) -> Option<Groups> {
///         match payload.get("type").and_then(|t| t.as_str()) {
///             Some("company") => Some(Groups::from(["Default", "Company"])),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait RequestObject: AsAny + fmt::Debug + Send {
    /// Builds an instance with an empty payload.
    ///
    /// # Errors
    ///
    /// Returns a [`Fault`] if the object cannot be built, e.g. because a
    /// dependency is unavailable. The binder never swallows it.
    fn construct() -> Result<Self, Fault>
    where
        Self: Sized;

    /// Returns the owned payload.
    fn payload(&self) -> &Payload;

    /// Returns the owned payload for the binder's one-time assignment.
    fn payload_mut(&mut self) -> &mut Payload;

    /// Returns the rules this object must satisfy.
    ///
    /// May read the current payload to pick different rules. No rules means
    /// the object is always valid.
    fn rules(&self) -> Ruleset {
        Ruleset::none()
    }

    /// Returns the validation groups to apply for `payload`.
    ///
    /// `None` selects the default group.
    fn validation_groups(&self, payload: &Payload) -> Option<Groups> {
        let _ = payload;
        None
    }

    /// Fallible form of [`rules`](Self::rules), used by the binder.
    ///
    /// Override it when resolving the rules can fail. A returned [`Fault`]
    /// becomes an internal-error response, or the fault's own status code.
    fn try_rules(&self) -> Result<Ruleset, Fault> {
        Ok(self.rules())
    }

    /// Fallible form of [`validation_groups`](Self::validation_groups), used
    /// by the binder.
    fn try_validation_groups(&self, payload: &Payload) -> Result<Option<Groups>, Fault> {
        Ok(self.validation_groups(payload))
    }

    /// Returns the top-level field `name`.
    fn get(&self, name: &str) -> Option<&Value> {
        self.payload().get(name)
    }

    /// Returns the top-level field `name`, or `default` when absent.
    fn get_or(&self, name: &str, default: Value) -> Value {
        self.payload().get_or(name, default)
    }

    /// Returns `true` if the top-level field `name` is present.
    fn has(&self, name: &str) -> bool {
        self.payload().has(name)
    }

    /// Returns the whole payload mapping.
    fn all(&self) -> &Map<String, Value> {
        self.payload().all()
    }
}

impl dyn RequestObject {
    /// Returns `true` if the erased object is a `T`.
    pub fn is<T: RequestObject>(&self) -> bool {
        AsAny::as_any(self).is::<T>()
    }

    /// Borrows the erased object as a `T`.
    pub fn downcast_ref<T: RequestObject>(&self) -> Option<&T> {
        AsAny::as_any(self).downcast_ref::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Plain {
        payload: Payload,
    }

    impl RequestObject for Plain {
        fn construct() -> Result<Self, Fault> {
            Ok(Self::default())
        }

        fn payload(&self) -> &Payload {
            &self.payload
        }

        fn payload_mut(&mut self) -> &mut Payload {
            &mut self.payload
        }
    }

    #[derive(Debug, Default)]
    struct Other {
        payload: Payload,
    }

    impl RequestObject for Other {
        fn construct() -> Result<Self, Fault> {
            Ok(Self::default())
        }

        fn payload(&self) -> &Payload {
            &self.payload
        }

        fn payload_mut(&mut self) -> &mut Payload {
            &mut self.payload
        }
    }

    #[test]
    fn defaults_declare_no_rules_and_no_groups() {
        let object = Plain::construct().unwrap();
        assert!(object.rules().is_empty());
        assert!(object.validation_groups(object.payload()).is_none());
        assert!(!object.payload().is_assigned());
    }

    #[test]
    fn accessors_delegate_to_payload() {
        let mut object = Plain::construct().unwrap();
        let body = json!({"name": "Ann"}).as_object().cloned().unwrap();
        object.payload_mut().assign(body).unwrap();

        assert_eq!(object.get("name"), Some(&json!("Ann")));
        assert_eq!(object.get_or("age", json!(18)), json!(18));
        assert!(object.has("name"));
        assert_eq!(object.all().len(), 1);
    }

    #[test]
    fn erased_objects_downcast_to_their_own_type() {
        let erased: Box<dyn RequestObject> = Box::new(Plain::default());

        assert!(erased.is::<Plain>());
        assert!(!erased.is::<Other>());
        assert!(erased.downcast_ref::<Plain>().is_some());
        assert!(erased.downcast_ref::<Other>().is_none());
    }
}
