//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the binder. It
//! handles:
//! - Mapping an HTTP request to a [`RequestAdapter`] (request ID, decoded
//!   body, accepted content types)
//! - Running the binding stage in front of a handler ([`Binder::dispatch`])
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: This module contains no framework-specific code.
//!    It defines interfaces that framework-specific code can implement.
//!
//! 2. **Decoded Bodies Only**: Body decoding happens upstream. A body that
//!    fails to decode never reaches binding.
//!
//! 3. **Explicit Composition**: No listeners or globals. The transport
//!    calls the binder and decides what to do with the outcome.
//!
//! # Example Flow
//!
//! ```ignore
//! // In a framework-specific integration (e.g., axum, actix):
//!
//! // 1. Build the adapter from the framework request
//! let adapter = RequestAdapter::extract(request_id, &http_req)?;
//!
//! // 2. Look up the handler's signature, registered at startup
//! let signature = registry.get("create_person").unwrap();
//!
//! // 3. Bind and call the handler, or return the error response
//! let response = binder.dispatch(&adapter, &signature, |bound| {
//!     let input = bound.and_then(|b| b.into_inner::<CreatePerson>());
//!     create_person(input)
//! });
//! ```
//!
//! [`Binder::dispatch`]: crate::Binder::dispatch

mod adapter;
mod extract;
mod middleware;

pub use adapter::RequestAdapter;
pub use extract::{ExtractAcceptable, ExtractPayload};
