//! Turning binding failures into responses and log records.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::binder::BindFailure;
use crate::logging::{FailureRecord, LogSink, TracingSink};
use crate::web::RequestAdapter;

/// Settings for [`FailureTranslator`].
///
/// Deserializable so it can live in an application's configuration file;
/// missing keys take their defaults.
///
/// # Examples
///
/// ```
/// use request_object::TranslatorConfig;
///
/// let config: TranslatorConfig =
///     serde_json::from_str(r#"{"validation_status": 400}"#).unwrap();
/// assert_eq!(config.validation_status, 400);
/// assert_eq!(config.validation_message, "Invalid Data");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Status for validation failures
    pub validation_status: u16,
    /// Top-level message for validation failures
    pub validation_message: String,
    /// Status for faults without a usable code
    pub fallback_status: u16,
    /// Accepted content types that get a structured body
    pub structured_types: Vec<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            validation_status: 422,
            validation_message: "Invalid Data".to_string(),
            fallback_status: 500,
            structured_types: vec!["application/json".to_string()],
        }
    }
}

impl TranslatorConfig {
    /// Sets the validation failure status.
    pub fn with_validation_status(mut self, status: u16) -> Self {
        self.validation_status = status;
        self
    }

    /// Sets the validation failure message.
    pub fn with_validation_message(mut self, message: impl Into<String>) -> Self {
        self.validation_message = message.into();
        self
    }

    /// Adds a content type that gets a structured body.
    pub fn with_structured_type(mut self, content_type: impl Into<String>) -> Self {
        self.structured_types.push(content_type.into());
        self
    }
}

/// The response produced for a failed binding.
///
/// `body` is `None` when the client does not accept a structured
/// representation; the transport then supplies its own default body.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    status: u16,
    body: Option<Value>,
}

impl ErrorResponse {
    /// Creates a response.
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the JSON body, if one was produced.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Returns `true` if a structured body was produced.
    pub fn is_structured(&self) -> bool {
        self.body.is_some()
    }

    /// Splits the response into status and body.
    pub fn into_parts(self) -> (u16, Option<Value>) {
        (self.status, self.body)
    }
}

/// Converts [`BindFailure`]s into [`ErrorResponse`]s and logs each one once.
///
/// - Validation failures become `422` with
///   `{"message": "Invalid Data", "errors": [{"<path>": "<message>"}, ...]}`.
/// - Faults become their own code when it is a valid HTTP status, otherwise
///   `500`, with `{"message": "<fault message>"}`.
#[derive(Debug)]
pub struct FailureTranslator<S = TracingSink> {
    config: TranslatorConfig,
    sink: S,
}

impl FailureTranslator<TracingSink> {
    /// Creates a translator that logs through `tracing`.
    pub fn new() -> Self {
        Self::with_sink(TracingSink)
    }
}

impl Default for FailureTranslator<TracingSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: LogSink> FailureTranslator<S> {
    /// Creates a translator that logs to `sink`.
    pub fn with_sink(sink: S) -> Self {
        Self {
            config: TranslatorConfig::default(),
            sink,
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: TranslatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Returns the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Produces the response for `failure` and logs it exactly once.
    ///
    /// The structured body is only produced when `request` accepts one of
    /// the configured structured content types; logging happens either way.
    pub fn translate(&self, request: &RequestAdapter, failure: &BindFailure) -> ErrorResponse {
        let structured = request.accepts_any(&self.config.structured_types);
        let response = self.to_response(failure, structured);
        self.sink
            .emit(&self.record(failure).with_request_id(request.request_id()));
        response
    }

    /// Builds the response without logging.
    pub fn to_response(&self, failure: &BindFailure, structured: bool) -> ErrorResponse {
        let status = self.status_for(failure);
        if !structured {
            return ErrorResponse::new(status, None);
        }
        let body = match failure {
            BindFailure::Invalid { violations, .. } => json!({
                "message": self.config.validation_message,
                "errors": violations,
            }),
            BindFailure::Fault(fault) => json!({ "message": fault.message() }),
        };
        ErrorResponse::new(status, Some(body))
    }

    /// Returns the status code for `failure`.
    pub fn status_for(&self, failure: &BindFailure) -> u16 {
        match failure {
            BindFailure::Invalid { .. } => self.config.validation_status,
            BindFailure::Fault(fault) if (100..=599).contains(&fault.code()) => fault.code(),
            BindFailure::Fault(_) => self.config.fallback_status,
        }
    }

    /// Builds the log record for `failure`.
    pub fn record(&self, failure: &BindFailure) -> FailureRecord {
        match failure {
            BindFailure::Invalid {
                violations,
                location,
                ..
            } => FailureRecord::for_validation(
                self.config.validation_status,
                self.config.validation_message.as_str(),
                violations.len(),
                location,
            ),
            BindFailure::Fault(fault) => FailureRecord::for_fault(fault),
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
    use crate::violation::Violations;
    use std::panic::Location;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Form {
        payload: Payload,
    }

    impl RequestObject for Form {
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

    fn json_request() -> RequestAdapter {
        let mut request = RequestAdapter::new("req-t".to_string());
        request.set_accept_header("application/json");
        request
    }

    fn invalid(violations: Violations) -> BindFailure {
        BindFailure::Invalid {
            object: Box::new(Form::default()),
            violations,
            location: Location::caller(),
        }
    }

    #[test]
    fn validation_failure_body_keeps_order_and_duplicates() {
        let mut violations = Violations::new();
        violations.add("name", "This field is missing.");
        violations.add("age", "too small");
        violations.add("age", "not even");

        let translator = FailureTranslator::with_sink(MemorySink::new());
        let response = translator.translate(&json_request(), &invalid(violations));

        assert_eq!(response.status(), 422);
        assert_eq!(
            response.body(),
            Some(&json!({
                "message": "Invalid Data",
                "errors": [
                    {"name": "This field is missing."},
                    {"age": "too small"},
                    {"age": "not even"}
                ]
            }))
        );
    }

    #[test]
    fn fault_uses_its_own_status() {
        let translator = FailureTranslator::with_sink(MemorySink::new());
        let failure = BindFailure::Fault(Fault::new("maintenance").with_code(503));
        let response = translator.translate(&json_request(), &failure);

        assert_eq!(response.status(), 503);
        assert_eq!(response.body(), Some(&json!({"message": "maintenance"})));
    }

    #[test]
    fn fault_without_usable_code_is_500() {
        let translator = FailureTranslator::with_sink(MemorySink::new());
        for fault in [Fault::new("x"), Fault::new("x").with_code(42), Fault::new("x").with_code(700)] {
            assert_eq!(translator.status_for(&BindFailure::Fault(fault)), 500);
        }
    }

    #[test]
    fn non_json_clients_get_no_body_but_are_logged() {
        let sink = Arc::new(MemorySink::new());
        let translator = FailureTranslator::with_sink(Arc::clone(&sink));
        let mut request = RequestAdapter::new("req-html".to_string());
        request.set_accept_header("text/html");

        let response = translator.translate(&request, &BindFailure::Fault(Fault::new("boom")));

        assert_eq!(response.status(), 500);
        assert!(!response.is_structured());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.records()[0].request_id.as_deref(), Some("req-html"));
    }

    #[test]
    fn each_translation_logs_once() {
        let sink = Arc::new(MemorySink::new());
        let translator = FailureTranslator::with_sink(Arc::clone(&sink));

        let mut violations = Violations::new();
        violations.add("a", "b");
        translator.translate(&json_request(), &invalid(violations));
        assert_eq!(sink.len(), 1);

        let record = &sink.records()[0];
        assert_eq!(record.code, 422);
        assert_eq!(record.violations, Some(1));
    }

    #[test]
    fn config_changes_validation_shape() {
        let config = TranslatorConfig::default()
            .with_validation_status(400)
            .with_validation_message("Bad input");
        let translator = FailureTranslator::with_sink(MemorySink::new()).with_config(config);

        let mut violations = Violations::new();
        violations.add("a", "b");
        let response = translator.to_response(&invalid(violations), true);

        assert_eq!(response.status(), 400);
        assert_eq!(response.body().unwrap()["message"], json!("Bad input"));
    }

    #[test]
    fn extra_structured_types_enable_bodies() {
        let config = TranslatorConfig::default().with_structured_type("application/problem+json");
        let translator = FailureTranslator::with_sink(MemorySink::new()).with_config(config);
        let mut request = RequestAdapter::new("req-p".to_string());
        request.set_accept_header("application/problem+json");

        let response = translator.translate(&request, &BindFailure::Fault(Fault::new("x")));
        assert!(response.is_structured());
    }
}
