//! Request objects: bind a decoded request body to a typed, validated
//! handler argument, and translate binding failures into HTTP responses.
//!
//! A handler declares at most one request-object parameter. Before the
//! handler runs, the [`Binder`] builds that object, hands it the decoded
//! body as its [`Payload`], and validates the payload against the object's
//! own rules and (payload-dependent) validation groups. Failures never
//! reach the handler: the [`FailureTranslator`] turns them into a `422`
//! with the violations, or an internal error, and logs each one once.
//!
//! # Core Types
//!
//! - [`RequestObject`]: Implemented by handler argument types
//! - [`Payload`]: Read-only view of the decoded body
//! - [`HandlerSignature`]: Handler parameters, resolved at registration time
//! - [`Binder`]: Produces a [`BindOutcome`] per request
//! - [`FailureTranslator`]: Builds the [`ErrorResponse`] and the log record
//!
//! # Examples
//!
//! ```
//! use request_object::validation::{Field, Ruleset};
//! use request_object::web::RequestAdapter;
//! use request_object::{Binder, BindOutcome, Fault, HandlerSignature, Payload, RequestObject};
//! use serde_json::json;
//!
//! #[derive(Debug, Default)]
//! struct CreatePerson {
//!     payload: Payload,
//! }
//!
//! impl RequestObject for CreatePerson {
//!     fn construct() -> Result<Self, Fault> {
//!         Ok(Self::default())
//!     }
//!     fn payload(&self) -> &Payload {
//!         &self.payload
//!     }
//!     fn payload_mut(&mut self) -> &mut Payload {
//!         &mut self.payload
//!     }
//!     fn rules(&self) -> Ruleset {
//!         Ruleset::one(Field::new("name").required().string())
//!             .with(Field::new("age").required().integer().min(0.0))
//!     }
//! }
//!
//! let signature = HandlerSignature::builder("create_person")
//!     .request_object::<CreatePerson>("input")
//!     .build()
//!     .expect("one request object");
//!
//! let mut request = RequestAdapter::new("req-123".to_string());
//! request.set_accept_header("application/json");
//! request.set_body_value(json!({"age": -5})).unwrap();
//!
//! let BindOutcome::Failed(response) = Binder::new().bind(&request, &signature) else {
//!     panic!("payload is invalid");
//! };
//! assert_eq!(response.status(), 422);
//! assert_eq!(
//!     response.body(),
//!     Some(&json!({
//!         "message": "Invalid Data",
//!         "errors": [
//!             {"name": "This field is missing."},
//!             {"age": "This value should be greater than or equal to 0."}
//!         ]
//!     }))
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod binder;
mod error;
mod logging;
mod payload;
mod request_object;
mod signature;
mod translator;
pub mod validation;
mod violation;
pub mod web;

#[cfg(test)]
mod test_utils;

pub use binder::{BindFailure, BindOutcome, Binder, BoundRequest};
pub use error::{Cause, Fault, PayloadError, SignatureError};
pub use logging::{
    FailureRecord, LogSink, MemorySink, PreviousRecord, RequestLog, SourceLocation, TracingSink,
    LOG_TARGET,
};
pub use payload::Payload;
pub use request_object::{AsAny, RequestObject};
pub use signature::{
    HandlerSignature, Param, ParamKind, RequestObjectSlot, SignatureBuilder,
    SignatureRegistry,
};
pub use translator::{ErrorResponse, FailureTranslator, TranslatorConfig};
pub use violation::{Violation, Violations};
