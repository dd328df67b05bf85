//! Extraction boundary traits for web integration.
//!
//! Framework glue implements these on its own request type so a
//! [`RequestAdapter`](super::RequestAdapter) can be built from it.

use serde_json::{Map, Value};

use crate::error::PayloadError;

/// Extracts the decoded JSON body from a framework-specific request.
///
/// Decoding itself happens upstream; a body that fails to decode never
/// reaches the binder. This trait only hands over the result, and rejects
/// bodies that are not key/value mappings.
///
/// # Examples
///
/// ```
/// use request_object::web::ExtractPayload;
/// use request_object::PayloadError;
/// use serde_json::{Map, Value};
///
/// struct MyFrameworkRequest {
///     json: Value,
/// }
///
/// impl ExtractPayload for MyFrameworkRequest {
///     fn extract_payload(&self) -> Result<Map<String, Value>, PayloadError> {
///         match &self.json {
///             Value::Object(map) => Ok(map.clone()),
///             _ => Err(PayloadError::NotAnObject("non-object")),
///         }
///     }
/// }
/// ```
pub trait ExtractPayload {
    /// Returns the decoded body as an object map.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::NotAnObject`] if the body is not an object.
    fn extract_payload(&self) -> Result<Map<String, Value>, PayloadError>;
}

/// Extracts the content types a client accepts.
///
/// The failure translator only renders a JSON body when one of these
/// matches its structured types.
pub trait ExtractAcceptable {
    /// Returns the accepted content types in header order, without
    /// media-type parameters.
    fn extract_acceptable(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::adapter::parse_accept;
    use crate::web::RequestAdapter;
    use serde_json::json;

    struct TestRequest {
        body: Value,
        accept: &'static str,
    }

    impl ExtractPayload for TestRequest {
        fn extract_payload(&self) -> Result<Map<String, Value>, PayloadError> {
            match &self.body {
                Value::Object(map) => Ok(map.clone()),
                _ => Err(PayloadError::NotAnObject("scalar")),
            }
        }
    }

    impl ExtractAcceptable for TestRequest {
        fn extract_acceptable(&self) -> Vec<String> {
            parse_accept(self.accept)
        }
    }

    #[test]
    fn adapter_is_built_from_framework_request() {
        let request = TestRequest {
            body: json!({"name": "Ann"}),
            accept: "application/json",
        };

        let adapter = RequestAdapter::extract("req-x".to_string(), &request).unwrap();
        assert_eq!(adapter.body()["name"], json!("Ann"));
        assert!(adapter.accepts_any(&["application/json".to_string()]));
    }

    #[test]
    fn non_object_body_is_rejected() {
        let request = TestRequest {
            body: json!(5),
            accept: "",
        };

        let err = RequestAdapter::extract("req-y".to_string(), &request).unwrap_err();
        assert_eq!(err, PayloadError::NotAnObject("scalar"));
    }
}
