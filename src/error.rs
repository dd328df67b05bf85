use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;

use thiserror::Error;

/// Errors raised while building a [`HandlerSignature`](crate::HandlerSignature)
/// or registering it.
///
/// These happen at registration time, never per request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// More than one parameter is typed as a request object.
    #[error("handler '{handler}' declares more than one request object parameter ('{first}' and '{second}')")]
    MultipleRequestObjects {
        /// Handler name
        handler: String,
        /// First request object parameter
        first: String,
        /// Offending second parameter
        second: String,
    },
    /// Two parameters share a name.
    #[error("handler '{handler}' declares parameter '{param}' twice")]
    DuplicateParameter {
        /// Handler name
        handler: String,
        /// Duplicated parameter name
        param: String,
    },
    /// A handler with this name is already registered.
    #[error("handler '{0}' is already registered")]
    DuplicateHandler(String),
}

/// Errors raised by the payload container.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// The payload was already populated; it can only be assigned once.
    #[error("payload has already been assigned")]
    AlreadyAssigned,
    /// The decoded body is not a key/value mapping.
    #[error("decoded body must be an object, got {0}")]
    NotAnObject(&'static str),
}

/// A generic processing fault raised while binding a request object.
///
/// Anything that goes wrong during construction, rule resolution, group
/// resolution or engine execution that is *not* a validation failure is a
/// `Fault`. The failure translator turns it into an internal-error response
/// (or the fault's own status code) and logs it once.
///
/// A fault remembers where it was created, the nearest call site that
/// observed it, and optionally the error it wraps.
///
/// # Examples
///
/// ```
/// use request_object::Fault;
///
/// let fault = Fault::new("database unavailable").with_code(503);
/// assert_eq!(fault.code(), 503);
/// assert_eq!(fault.message(), "database unavailable");
/// assert!(fault.occurred().file().ends_with(".rs"));
/// ```
#[derive(Debug)]
pub struct Fault {
    message: String,
    code: u16,
    occurred: &'static Location<'static>,
    called: Option<&'static Location<'static>>,
    cause: Option<Cause>,
}

impl Fault {
    /// Creates a fault with no code, recording the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 0,
            occurred: Location::caller(),
            called: None,
            cause: None,
        }
    }

    /// Wraps an underlying error as the cause of a new fault.
    ///
    /// The fault's message is the cause's `Display` output. The cause's type
    /// name and the wrap location are kept for the log record.
    #[track_caller]
    pub fn wrap<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let location = Location::caller();
        Self {
            message: error.to_string(),
            code: 0,
            occurred: location,
            called: None,
            cause: Some(Cause {
                type_name: std::any::type_name::<E>(),
                location,
                error: Box::new(error),
            }),
        }
    }

    /// Sets an explicit numeric code (usually an HTTP status).
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    /// Attaches an underlying error as this fault's cause.
    #[track_caller]
    pub fn caused_by<E>(mut self, error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Cause {
            type_name: std::any::type_name::<E>(),
            location: Location::caller(),
            error: Box::new(error),
        });
        self
    }

    /// Records the call site that observed this fault.
    ///
    /// Only the first recorded call site is kept, so the record points at
    /// the frame nearest the fault's origin.
    pub fn called_at(mut self, location: &'static Location<'static>) -> Self {
        if self.called.is_none() {
            self.called = Some(location);
        }
        self
    }

    /// Returns the fault message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the explicit code, or `0` when none was set.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Returns where the fault was created.
    pub fn occurred(&self) -> &'static Location<'static> {
        self.occurred
    }

    /// Returns the nearest recorded call site, falling back to the origin.
    pub fn called(&self) -> &'static Location<'static> {
        self.called.unwrap_or(self.occurred)
    }

    /// Returns the wrapped cause, if any.
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code == 0 {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} (code {})", self.message, self.code)
        }
    }
}

impl StdError for Fault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause.error.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<PayloadError> for Fault {
    #[track_caller]
    fn from(err: PayloadError) -> Self {
        Fault::wrap(err)
    }
}

/// The error wrapped by a [`Fault`].
#[derive(Debug)]
pub struct Cause {
    type_name: &'static str,
    location: &'static Location<'static>,
    error: Box<dyn StdError + Send + Sync>,
}

impl Cause {
    /// Returns the cause's message.
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// Returns the Rust type name of the wrapped error.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns where the cause was attached.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Returns the wrapped error.
    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_records_creation_site() {
        let fault = Fault::new("boom");
        assert!(fault.occurred().file().ends_with("error.rs"));
        assert_eq!(fault.code(), 0);
        assert!(fault.cause().is_none());
    }

    #[test]
    fn called_defaults_to_origin() {
        let fault = Fault::new("boom");
        assert_eq!(fault.called(), fault.occurred());
    }

    #[test]
    fn called_at_keeps_first_site() {
        let first = Location::caller();
        let fault = Fault::new("boom").called_at(first);
        let fault = fault.called_at(Location::caller());
        assert_eq!(fault.called().line(), first.line());
    }

    #[test]
    fn wrap_keeps_cause_details() {
        let fault = Fault::wrap(PayloadError::AlreadyAssigned);
        let cause = fault.cause().expect("cause recorded");

        assert_eq!(fault.message(), "payload has already been assigned");
        assert!(cause.type_name().ends_with("PayloadError"));
        assert_eq!(cause.message(), "payload has already been assigned");
        assert!(fault.source().is_some());
    }

    #[test]
    fn caused_by_keeps_own_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config missing");
        let fault = Fault::new("dependency unavailable").caused_by(io);

        assert_eq!(fault.message(), "dependency unavailable");
        assert_eq!(fault.cause().unwrap().message(), "config missing");
        assert!(fault.cause().unwrap().type_name().contains("io"));
    }

    #[test]
    fn display_includes_code_when_set() {
        assert_eq!(Fault::new("gone").to_string(), "gone");
        assert_eq!(Fault::new("gone").with_code(410).to_string(), "gone (code 410)");
    }

    #[test]
    fn signature_error_messages() {
        let err = SignatureError::MultipleRequestObjects {
            handler: "create".to_string(),
            first: "a".to_string(),
            second: "b".to_string(),
        };
        assert!(err.to_string().contains("more than one request object"));
        assert_eq!(
            SignatureError::DuplicateHandler("x".to_string()).to_string(),
            "handler 'x' is already registered"
        );
    }
}
