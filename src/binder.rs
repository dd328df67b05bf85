//! The binder: builds, validates and attaches request objects.

use std::fmt;
use std::panic::Location;

use serde_json::{Map, Value};

use crate::error::Fault;
use crate::logging::{LogSink, RequestLog, TracingSink};
use crate::request_object::{AsAny, RequestObject};
use crate::signature::{HandlerSignature, RequestObjectSlot};
use crate::translator::{ErrorResponse, FailureTranslator};
use crate::validation::{ConstraintEngine, ValidationEngine};
use crate::violation::Violations;
use crate::web::RequestAdapter;

/// What the transport should do after binding.
#[derive(Debug)]
pub enum BindOutcome {
    /// The handler takes no request object; proceed unchanged.
    NotApplicable,
    /// The request object was built and validated.
    Bound(BoundRequest),
    /// Binding failed; return this response without calling the handler.
    Failed(ErrorResponse),
}

impl BindOutcome {
    /// Returns `true` for [`BindOutcome::NotApplicable`].
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, BindOutcome::NotApplicable)
    }

    /// Returns `true` for [`BindOutcome::Bound`].
    pub fn is_bound(&self) -> bool {
        matches!(self, BindOutcome::Bound(_))
    }

    /// Returns `true` for [`BindOutcome::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, BindOutcome::Failed(_))
    }
}

/// A validated request object and the argument position it fills.
pub struct BoundRequest {
    position: usize,
    object: Box<dyn RequestObject>,
}

impl BoundRequest {
    /// Returns the handler argument position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Borrows the erased request object.
    pub fn object(&self) -> &dyn RequestObject {
        self.object.as_ref()
    }

    /// Borrows the request object as its concrete type.
    pub fn downcast_ref<T: RequestObject>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }

    /// Takes the request object out as its concrete type.
    ///
    /// Returns `None` if the object is not a `T`.
    pub fn into_inner<T: RequestObject>(self) -> Option<T> {
        AsAny::into_any(self.object)
            .downcast::<T>()
            .ok()
            .map(|object| *object)
    }
}

impl fmt::Debug for BoundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundRequest")
            .field("position", &self.position)
            .field("object", &self.object)
            .finish()
    }
}

/// Why binding did not produce a request object.
#[derive(Debug)]
pub enum BindFailure {
    /// The payload violated the declared rules.
    Invalid {
        /// The request object that failed validation
        object: Box<dyn RequestObject>,
        /// The violations, in engine order
        violations: Violations,
        /// Where the failure was raised
        location: &'static Location<'static>,
    },
    /// An unexpected fault during construction, rule or group resolution,
    /// or engine execution.
    Fault(Fault),
}

impl BindFailure {
    /// Returns the violations of a validation failure.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            BindFailure::Invalid { violations, .. } => Some(violations),
            BindFailure::Fault(_) => None,
        }
    }

    /// Returns the offending request object of a validation failure.
    pub fn object(&self) -> Option<&dyn RequestObject> {
        match self {
            BindFailure::Invalid { object, .. } => Some(object.as_ref()),
            BindFailure::Fault(_) => None,
        }
    }
}

impl From<Fault> for BindFailure {
    fn from(fault: Fault) -> Self {
        BindFailure::Fault(fault)
    }
}

impl fmt::Display for BindFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindFailure::Invalid { violations, .. } => {
                write!(f, "invalid request payload: {}", violations)
            }
            BindFailure::Fault(fault) => write!(f, "binding fault: {}", fault),
        }
    }
}

/// Resolves request objects for handlers.
///
/// One binder is shared by every request. It holds no per-request state:
/// each call to [`bind`](Self::bind) builds a fresh request object.
///
/// # Examples
///
/// ```
/// use request_object::validation::{Field, Ruleset};
/// use request_object::web::RequestAdapter;
/// use request_object::{Binder, BindOutcome, Fault, HandlerSignature, Payload, RequestObject};
/// use serde_json::json;
///
/// #[derive(Debug, Default)]
/// struct CreatePerson {
///     payload: Payload,
/// }
///
/// impl RequestObject for CreatePerson {
///     fn construct() -> Result<Self, Fault> {
///         Ok(Self::default())
///     }
///     fn payload(&self) -> &Payload {
///         &self.payload
///     }
///     fn payload_mut(&mut self) -> &mut Payload {
///         &mut self.payload
///     }
///     fn rules(&self) -> Ruleset {
///         Ruleset::one(Field::new("name").required().string())
///     }
/// }
///
/// let signature = HandlerSignature::builder("create_person")
///     .request_object::<CreatePerson>("input")
///     .build()
///     .unwrap();
///
/// let mut request = RequestAdapter::new("req-1".to_string());
/// request.set_body(json!({"name": "Ann"}).as_object().cloned().unwrap());
///
/// match Binder::new().bind(&request, &signature) {
///     BindOutcome::Bound(bound) => {
///         let person = bound.into_inner::<CreatePerson>().unwrap();
///         assert_eq!(person.get("name"), Some(&json!("Ann")));
///     }
///     other => panic!("unexpected outcome: {:?}", other),
/// }
/// ```
#[derive(Debug)]
pub struct Binder<E = ConstraintEngine, S = TracingSink> {
    engine: E,
    translator: FailureTranslator<S>,
}

impl Binder {
    /// Creates a binder with the built-in engine that logs through `tracing`.
    pub fn new() -> Self {
        Self::with_parts(ConstraintEngine, FailureTranslator::new())
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ValidationEngine, S: LogSink> Binder<E, S> {
    /// Creates a binder from an engine and a translator.
    pub fn with_parts(engine: E, translator: FailureTranslator<S>) -> Self {
        Self { engine, translator }
    }

    /// Returns the validation engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the failure translator.
    pub fn translator(&self) -> &FailureTranslator<S> {
        &self.translator
    }

    /// Binds the request object `signature` declares, if any.
    ///
    /// Failures are translated (and logged once) before returning, so the
    /// transport only has to send [`BindOutcome::Failed`] back as is.
    pub fn bind(&self, request: &RequestAdapter, signature: &HandlerSignature) -> BindOutcome {
        let log = RequestLog::new(request.request_id());

        let Some(slot) = signature.request_object() else {
            log.debug(format_args!(
                "handler '{}' takes no request object",
                signature.handler()
            ));
            return BindOutcome::NotApplicable;
        };

        match self.resolve(slot, request.body()) {
            Ok(object) => {
                log.debug(format_args!(
                    "bound {} for handler '{}'",
                    slot.type_name(),
                    signature.handler()
                ));
                BindOutcome::Bound(BoundRequest {
                    position: slot.position(),
                    object,
                })
            }
            Err(failure) => {
                log.debug(format_args!(
                    "binding {} for handler '{}' failed: {}",
                    slot.type_name(),
                    signature.handler(),
                    failure
                ));
                BindOutcome::Failed(self.translator.translate(request, &failure))
            }
        }
    }

    /// Builds and validates the request object for `slot` from `body`,
    /// without translating failures.
    ///
    /// # Errors
    ///
    /// - [`BindFailure::Invalid`] if the engine reports violations
    /// - [`BindFailure::Fault`] if construction, payload assignment, rule or
    ///   group resolution, or the engine fails
    pub fn resolve(
        &self,
        slot: &RequestObjectSlot,
        body: &Map<String, Value>,
    ) -> Result<Box<dyn RequestObject>, BindFailure> {
        let mut object = slot
            .construct()
            .map_err(|fault| fault.called_at(Location::caller()))?;

        object
            .payload_mut()
            .assign(body.clone())
            .map_err(|err| Fault::from(err).called_at(Location::caller()))?;

        let rules = object
            .try_rules()
            .map_err(|fault| fault.called_at(Location::caller()))?;
        if rules.is_empty() {
            return Ok(object);
        }

        let groups = object
            .try_validation_groups(object.payload())
            .map_err(|fault| fault.called_at(Location::caller()))?
            .unwrap_or_default();

        let violations = self
            .engine
            .validate(object.payload(), &rules, &groups)
            .map_err(|fault| fault.called_at(Location::caller()))?;

        if violations.is_valid() {
            Ok(object)
        } else {
            Err(BindFailure::Invalid {
                object,
                violations,
                location: Location::caller(),
            })
        }
    }
}
