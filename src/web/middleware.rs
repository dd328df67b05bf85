//! The binding stage of a request pipeline.
//!
//! Binding runs after the body is decoded and before the handler is called.
//! There is no event hook: the transport calls [`Binder::dispatch`] with
//! the handler as a closure.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework decodes the body and builds a RequestAdapter
//!   ↓
//! Binder::dispatch(&adapter, &signature, handler)
//!   ↓
//! Failed     → ErrorResponse converted into the framework response
//! Bound      → handler(Some(bound))
//! NotApplicable → handler(None)
//! ```

use crate::binder::{BindOutcome, Binder, BoundRequest};
use crate::logging::LogSink;
use crate::signature::HandlerSignature;
use crate::translator::ErrorResponse;
use crate::validation::ValidationEngine;

use super::RequestAdapter;

impl<E: ValidationEngine, S: LogSink> Binder<E, S> {
    /// Binds the request and either calls `handler` or short-circuits.
    ///
    /// `handler` receives the bound request object, or `None` when the
    /// signature declares none. On a binding failure the handler is never
    /// called and the translated [`ErrorResponse`] is converted into `R`.
    ///
    /// # Examples
    ///
    /// ```
    /// use request_object::web::RequestAdapter;
    /// use request_object::{Binder, ErrorResponse, HandlerSignature};
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Reply(u16);
    ///
    /// impl From<ErrorResponse> for Reply {
    ///     fn from(response: ErrorResponse) -> Self {
    ///         Reply(response.status())
    ///     }
    /// }
    ///
    /// let signature = HandlerSignature::builder("health").build().unwrap();
    /// let request = RequestAdapter::new("req-1".to_string());
    ///
    /// let reply = Binder::new().dispatch(&request, &signature, |bound| {
    ///     assert!(bound.is_none());
    ///     Reply(200)
    /// });
    /// assert_eq!(reply, Reply(200));
    /// ```
    pub fn dispatch<F, R>(&self, request: &RequestAdapter, signature: &HandlerSignature, handler: F) -> R
    where
        F: FnOnce(Option<BoundRequest>) -> R,
        R: From<ErrorResponse>,
    {
        match self.bind(request, signature) {
            BindOutcome::NotApplicable => handler(None),
            BindOutcome::Bound(bound) => handler(Some(bound)),
            BindOutcome::Failed(response) => R::from(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fault;
    use crate::logging::MemorySink;
    use crate::payload::Payload;
    use crate::request_object::RequestObject;
    use crate::translator::FailureTranslator;
    use crate::validation::{ConstraintEngine, Field, Ruleset};
    use serde_json::json;
    use std::cell::Cell;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Login {
        payload: Payload,
    }

    impl RequestObject for Login {
        fn construct() -> Result<Self, Fault> {
            Ok(Self::default())
        }

        fn payload(&self) -> &Payload {
            &self.payload
        }

        fn payload_mut(&mut self) -> &mut Payload {
            &mut self.payload
        }

        fn rules(&self) -> Ruleset {
            Ruleset::one(Field::new("user").required().string().not_blank())
        }
    }

    #[derive(Debug, PartialEq)]
    enum Reply {
        Handled(String),
        Error(u16),
    }

    impl From<ErrorResponse> for Reply {
        fn from(response: ErrorResponse) -> Self {
            Reply::Error(response.status())
        }
    }

    fn login_signature() -> HandlerSignature {
        HandlerSignature::builder("login")
            .request_object::<Login>("form")
            .build()
            .unwrap()
    }

    fn binder() -> Binder<ConstraintEngine, Arc<MemorySink>> {
        Binder::with_parts(
            ConstraintEngine,
            FailureTranslator::with_sink(Arc::new(MemorySink::new())),
        )
    }

    #[test]
    fn handler_receives_the_bound_object() {
        let mut request = RequestAdapter::new("req-1".to_string());
        request.set_body_value(json!({"user": "ann"})).unwrap();

        let reply = binder().dispatch(&request, &login_signature(), |bound| {
            let login = bound.and_then(|b| b.into_inner::<Login>()).unwrap();
            Reply::Handled(login.get("user").unwrap().to_string())
        });

        assert_eq!(reply, Reply::Handled("\"ann\"".to_string()));
    }

    #[test]
    fn failed_binding_short_circuits() {
        let mut request = RequestAdapter::new("req-2".to_string());
        request.set_body_value(json!({"user": ""})).unwrap();
        let called = Cell::new(false);

        let reply = binder().dispatch(&request, &login_signature(), |_| {
            called.set(true);
            Reply::Handled(String::new())
        });

        assert_eq!(reply, Reply::Error(422));
        assert!(!called.get());
    }

    #[test]
    fn not_applicable_passes_none() {
        let signature = HandlerSignature::builder("index")
            .param::<u32>("page")
            .build()
            .unwrap();
        let request = RequestAdapter::new("req-3".to_string());

        let reply = binder().dispatch(&request, &signature, |bound| {
            Reply::Handled(format!("{}", bound.is_none()))
        });

        assert_eq!(reply, Reply::Handled("true".to_string()));
    }
}
