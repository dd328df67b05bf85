//! Request adapter carrying what binding needs from an HTTP request.

use serde_json::{Map, Value};

use crate::error::PayloadError;
use crate::payload::json_kind;

use super::{ExtractAcceptable, ExtractPayload};

/// Framework-agnostic view of an incoming request.
///
/// `RequestAdapter` holds the three things binding reads: the request ID
/// (for log correlation), the decoded JSON body, and the content types the
/// client accepts. Framework-specific code builds one per request, either
/// by hand or through [`RequestAdapter::extract`].
///
/// # Examples
///
/// ```
/// use request_object::web::RequestAdapter;
/// use serde_json::json;
///
/// let mut adapter = RequestAdapter::new("req-12345".to_string());
/// adapter.set_body_value(json!({"name": "Ann"})).unwrap();
/// adapter.set_accept_header("text/html, application/json;q=0.9");
///
/// assert_eq!(adapter.request_id(), "req-12345");
/// assert_eq!(adapter.body()["name"], json!("Ann"));
/// assert_eq!(
///     adapter.acceptable_content_types(),
///     ["text/html".to_string(), "application/json".to_string()]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestAdapter {
    /// Unique request identifier
    request_id: String,
    /// Decoded JSON body
    body: Map<String, Value>,
    /// Accepted content types, in header order
    accept: Vec<String>,
}

impl RequestAdapter {
    /// Creates an adapter with the given request ID, an empty body and no
    /// accepted content types.
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            ..Self::default()
        }
    }

    /// Builds an adapter from a framework request.
    ///
    /// # Errors
    ///
    /// Returns whatever error the framework's body extraction reports.
    pub fn extract<R>(request_id: String, request: &R) -> Result<Self, PayloadError>
    where
        R: ExtractPayload + ExtractAcceptable + ?Sized,
    {
        Ok(Self {
            request_id,
            body: request.extract_payload()?,
            accept: request.extract_acceptable(),
        })
    }

    /// Replaces the decoded body.
    pub fn set_body(&mut self, body: Map<String, Value>) {
        self.body = body;
    }

    /// Builder-style [`set_body`](Self::set_body).
    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = body;
        self
    }

    /// Replaces the decoded body from an arbitrary JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::NotAnObject`] unless `value` is a JSON object.
    pub fn set_body_value(&mut self, value: Value) -> Result<(), PayloadError> {
        match value {
            Value::Object(body) => {
                self.body = body;
                Ok(())
            }
            other => Err(PayloadError::NotAnObject(json_kind(&other))),
        }
    }

    /// Returns the decoded body.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Appends one accepted content type.
    pub fn add_accept(&mut self, content_type: impl Into<String>) {
        self.accept.push(content_type.into());
    }

    /// Replaces the accepted content types by parsing an `Accept` header.
    ///
    /// Media-type parameters are stripped and header order is kept. Ranges
    /// with `q=0` are refused by the client and dropped.
    pub fn set_accept_header(&mut self, header: &str) {
        self.accept = parse_accept(header);
    }

    /// Returns the accepted content types.
    pub fn acceptable_content_types(&self) -> &[String] {
        &self.accept
    }

    /// Returns `true` if any of `content_types` is accepted.
    ///
    /// Comparison ignores ASCII case; wildcard ranges such as `*/*` do not match.
    pub fn accepts_any(&self, content_types: &[String]) -> bool {
        self.accept
            .iter()
            .any(|accepted| content_types.iter().any(|ct| ct.eq_ignore_ascii_case(accepted)))
    }

    /// Returns a reference to the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl ExtractPayload for RequestAdapter {
    fn extract_payload(&self) -> Result<Map<String, Value>, PayloadError> {
        Ok(self.body.clone())
    }
}

impl ExtractAcceptable for RequestAdapter {
    fn extract_acceptable(&self) -> Vec<String> {
        self.accept.clone()
    }
}

/// Splits an `Accept` header into bare media ranges.
pub(crate) fn parse_accept(header: &str) -> Vec<String> {
    header
        .split(',')
        .filter_map(|range| {
            let mut parts = range.split(';').map(str::trim);
            let media = parts.next().filter(|media| !media.is_empty())?;
            let refused = parts.any(|param| {
                param
                    .split_once('=')
                    .filter(|(key, _)| key.trim().eq_ignore_ascii_case("q"))
                    .and_then(|(_, q)| q.trim().parse::<f32>().ok())
                    .is_some_and(|q| q <= 0.0)
            });
            (!refused).then(|| media.to_ascii_lowercase())
        })
        .collect()
}
