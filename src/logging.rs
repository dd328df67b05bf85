//! Structured failure records and the sinks that receive them.

use std::fmt;
use std::panic::Location;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::error::Fault;

/// Tracing target used for everything this crate logs.
pub const LOG_TARGET: &str = "request_object";

/// A per-request logger that tags every message with the request ID.
///
/// Lifetime-bound to the request it was created for.
#[derive(Debug)]
pub struct RequestLog<'a> {
    request_id: &'a str,
}

impl<'a> RequestLog<'a> {
    /// Creates a logger for the given request.
    pub fn new(request_id: &'a str) -> Self {
        Self { request_id }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Logs a debug-level message with request ID.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(target: LOG_TARGET, request_id = %self.request_id, "{}", args);
    }
}

/// A file/line pair in a log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Source file
    pub file: String,
    /// Line number
    pub line: u32,
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self {
            file: location.file().to_string(),
            line: location.line(),
        }
    }
}

/// The cause a fault wrapped, as logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviousRecord {
    /// The cause's message
    pub message: String,
    /// Rust type name of the cause
    pub exception: String,
    /// Where the cause was attached
    pub file: String,
    /// Line where the cause was attached
    pub line: u32,
}

/// One structured log record describing a binding failure.
///
/// # Examples
///
/// ```
/// use request_object::{Fault, FailureRecord};
///
/// let record = FailureRecord::for_fault(&Fault::new("no mailer").with_code(503));
/// assert_eq!(record.code, 503);
/// assert!(record.to_json().contains("\"occurred\""));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Fault code, or the response status for validation failures
    pub code: u16,
    /// Failure message
    pub message: String,
    /// Nearest recorded call site
    pub called: SourceLocation,
    /// Where the failure was raised
    pub occurred: SourceLocation,
    /// The wrapped cause, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<PreviousRecord>,
    /// Number of violations, for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<usize>,
    /// ID of the request that failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl FailureRecord {
    /// Builds the record for a generic fault.
    pub fn for_fault(fault: &Fault) -> Self {
        Self {
            code: fault.code(),
            message: fault.message().to_string(),
            called: fault.called().into(),
            occurred: fault.occurred().into(),
            previous: fault.cause().map(|cause| PreviousRecord {
                message: cause.message(),
                exception: cause.type_name().to_string(),
                file: cause.location().file().to_string(),
                line: cause.location().line(),
            }),
            violations: None,
            request_id: None,
        }
    }

    /// Builds the record for a validation failure raised at `location`.
    pub fn for_validation(
        code: u16,
        message: impl Into<String>,
        violations: usize,
        location: &Location<'_>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            called: location.into(),
            occurred: location.into(),
            previous: None,
            violations: Some(violations),
            request_id: None,
        }
    }

    /// Tags the record with a request ID.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Serializes the record as JSON, falling back to the `Debug` form if
    /// serialization fails.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| format!("{:?} ({})", self, err))
    }
}

/// Receives one record per failure.
///
/// Implementations must not panic; a sink that cannot deliver a record drops it.
pub trait LogSink: Send + Sync {
    /// Delivers a record.
    fn emit(&self, record: &FailureRecord);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn emit(&self, record: &FailureRecord) {
        (**self).emit(record);
    }
}

/// Emits records as `tracing` events.
///
/// Server-side failures (code 500 and up, or no code) go out at `ERROR`,
/// client-side ones at `WARN`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: &FailureRecord) {
        let json = record.to_json();
        let request_id = record.request_id.as_deref().unwrap_or("-");
        if record.code == 0 || record.code >= 500 {
            tracing::error!(
                target: LOG_TARGET,
                request_id = %request_id,
                code = record.code,
                occurred_file = %record.occurred.file,
                occurred_line = record.occurred.line,
                record = %json,
                "request binding failed"
            );
        } else {
            tracing::warn!(
                target: LOG_TARGET,
                request_id = %request_id,
                code = record.code,
                record = %json,
                "request binding rejected"
            );
        }
    }
}

/// In-memory sink that keeps every record it receives.
///
/// Useful in tests and for inspecting failures without a subscriber.
///
/// # Examples
///
/// ```
/// use request_object::{Fault, FailureRecord, LogSink, MemorySink};
///
/// let sink = MemorySink::new();
/// sink.emit(&FailureRecord::for_fault(&Fault::new("boom")));
/// assert_eq!(sink.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<FailureRecord>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all records in arrival order.
    pub fn records(&self) -> Vec<FailureRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all records.
    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: &FailureRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}
