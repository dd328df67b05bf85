//! Handler signatures, resolved once at registration time.
//!
//! The binder must decide on every request whether the target handler needs
//! a request object. Doing that by inspecting types per request would be
//! slow, so the decision is made when the signature is built: the builder
//! records the position of the (single) request object parameter together
//! with a constructor for its concrete type.

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Fault, SignatureError};
use crate::request_object::RequestObject;

type Constructor = fn() -> Result<Box<dyn RequestObject>, Fault>;

fn construct_erased<T: RequestObject>() -> Result<Box<dyn RequestObject>, Fault> {
    T::construct().map(|object| Box::new(object) as Box<dyn RequestObject>)
}

/// How a handler parameter is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Supplied by the transport (path values, services, ...)
    Plain,
    /// Supplied by the binder as a validated request object
    RequestObject,
}

/// One declared handler parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    type_name: &'static str,
    kind: ParamKind,
}

impl Param {
    /// Returns the parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the Rust type name of the parameter.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns how the parameter is supplied.
    pub fn kind(&self) -> ParamKind {
        self.kind
    }
}

/// The request object parameter of a handler, with its constructor.
#[derive(Clone)]
pub struct RequestObjectSlot {
    position: usize,
    name: String,
    type_name: &'static str,
    construct: Constructor,
}

impl RequestObjectSlot {
    /// Returns the argument position the bound object fills.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the Rust type name of the request object.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Builds a fresh, empty instance of the declared request object.
    pub(crate) fn construct(&self) -> Result<Box<dyn RequestObject>, Fault> {
        (self.construct)()
    }
}

impl fmt::Debug for RequestObjectSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestObjectSlot")
            .field("position", &self.position)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A handler's declared inputs.
///
/// # Examples
///
/// ```
/// use request_object::{Fault, HandlerSignature, Payload, RequestObject};
///
/// #[derive(Debug, Default)]
/// struct UpdateProfile {
///     payload: Payload,
/// }
///
/// impl RequestObject for UpdateProfile {
///     fn construct() -> Result<Self, Fault> {
///         Ok(Self::default())
///     }
///     fn payload(&self) -> &Payload {
///         &self.payload
///     }
///     fn payload_mut(&mut self) -> &mut Payload {
///         &mut self.payload
///     }
/// }
///
/// let signature = HandlerSignature::builder("update_profile")
///     .param::<u64>("user_id")
///     .request_object::<UpdateProfile>("input")
///     .build()
///     .expect("one request object parameter");
///
/// let slot = signature.request_object().unwrap();
/// assert_eq!(slot.position(), 1);
/// assert_eq!(slot.name(), "input");
///
/// let listing = HandlerSignature::builder("list_users")
///     .param::<u32>("page")
///     .build()
///     .unwrap();
/// assert!(!listing.requires_binding());
/// ```
#[derive(Debug, Clone)]
pub struct HandlerSignature {
    handler: String,
    params: Vec<Param>,
    request_object: Option<RequestObjectSlot>,
}

impl HandlerSignature {
    /// Starts building a signature for the named handler.
    pub fn builder(handler: impl Into<String>) -> SignatureBuilder {
        SignatureBuilder {
            handler: handler.into(),
            params: Vec::new(),
        }
    }

    /// Returns the handler name.
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Returns the declared parameters in order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Returns the request object parameter, if the handler declares one.
    pub fn request_object(&self) -> Option<&RequestObjectSlot> {
        self.request_object.as_ref()
    }

    /// Returns `true` if the handler takes a request object.
    pub fn requires_binding(&self) -> bool {
        self.request_object.is_some()
    }
}

/// Builder for [`HandlerSignature`].
pub struct SignatureBuilder {
    handler: String,
    params: Vec<(Param, Option<Constructor>)>,
}

impl SignatureBuilder {
    /// Declares a parameter supplied by the transport.
    pub fn param<T: 'static>(mut self, name: impl Into<String>) -> Self {
        self.params.push((
            Param {
                name: name.into(),
                type_name: type_name::<T>(),
                kind: ParamKind::Plain,
            },
            None,
        ));
        self
    }

    /// Declares a parameter bound to the request object type `T`.
    pub fn request_object<T: RequestObject>(mut self, name: impl Into<String>) -> Self {
        self.params.push((
            Param {
                name: name.into(),
                type_name: type_name::<T>(),
                kind: ParamKind::RequestObject,
            },
            Some(construct_erased::<T> as Constructor),
        ));
        self
    }

    /// Validates the declaration and resolves the request object slot.
    ///
    /// # Errors
    ///
    /// - [`SignatureError::DuplicateParameter`] if two parameters share a name
    /// - [`SignatureError::MultipleRequestObjects`] if more than one parameter
    ///   is a request object
    pub fn build(self) -> Result<HandlerSignature, SignatureError> {
        let mut request_object: Option<RequestObjectSlot> = None;
        let mut params = Vec::with_capacity(self.params.len());

        for (position, (param, construct)) in self.params.into_iter().enumerate() {
            if params.iter().any(|p: &Param| p.name == param.name) {
                return Err(SignatureError::DuplicateParameter {
                    handler: self.handler,
                    param: param.name,
                });
            }

            if let Some(construct) = construct {
                if let Some(first) = &request_object {
                    return Err(SignatureError::MultipleRequestObjects {
                        handler: self.handler,
                        first: first.name.clone(),
                        second: param.name,
                    });
                }
                request_object = Some(RequestObjectSlot {
                    position,
                    name: param.name.clone(),
                    type_name: param.type_name,
                    construct,
                });
            }
            params.push(param);
        }

        Ok(HandlerSignature {
            handler: self.handler,
            params,
            request_object,
        })
    }
}

/// Handler signatures by handler name.
///
/// The transport registers each handler once at startup and looks the
/// signature up per request.
#[derive(Debug, Default)]
pub struct SignatureRegistry {
    signatures: HashMap<String, Arc<HandlerSignature>>,
}

impl SignatureRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a signature under its handler name.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::DuplicateHandler`] if the name is taken.
    pub fn register(
        &mut self,
        signature: HandlerSignature,
    ) -> Result<Arc<HandlerSignature>, SignatureError> {
        if self.signatures.contains_key(signature.handler()) {
            return Err(SignatureError::DuplicateHandler(
                signature.handler().to_string(),
            ));
        }
        let signature = Arc::new(signature);
        self.signatures
            .insert(signature.handler().to_string(), Arc::clone(&signature));
        Ok(signature)
    }

    /// Returns the signature registered for `handler`.
    pub fn get(&self, handler: &str) -> Option<Arc<HandlerSignature>> {
        self.signatures.get(handler).cloned()
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Payload;

    #[derive(Debug, Default)]
    struct Input {
        payload: Payload,
    }

    impl RequestObject for Input {
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

    #[derive(Debug)]
    struct Broken;

    impl RequestObject for Broken {
        fn construct() -> Result<Self, Fault> {
            Err(Fault::new("mailer service missing").with_code(503))
        }

        fn payload(&self) -> &Payload {
            unreachable!("never constructed")
        }

        fn payload_mut(&mut self) -> &mut Payload {
            unreachable!("never constructed")
        }
    }

    #[test]
    fn plain_params_need_no_binding() {
        let signature = HandlerSignature::builder("show")
            .param::<i64>("id")
            .build()
            .unwrap();

        assert!(!signature.requires_binding());
        assert_eq!(signature.params()[0].type_name(), "i64");
        assert_eq!(signature.params()[0].kind(), ParamKind::Plain);
    }

    #[test]
    fn request_object_slot_is_resolved() {
        let signature = HandlerSignature::builder("create")
            .param::<String>("tenant")
            .request_object::<Input>("input")
            .build()
            .unwrap();

        let slot = signature.request_object().expect("slot resolved");
        assert_eq!(slot.position(), 1);
        assert!(slot.type_name().ends_with("Input"));
        assert_eq!(signature.params()[1].kind(), ParamKind::RequestObject);

        let object = slot.construct().expect("constructible");
        assert!(object.is::<Input>());
    }

    #[test]
    fn constructor_faults_surface() {
        let signature = HandlerSignature::builder("notify")
            .request_object::<Broken>("input")
            .build()
            .unwrap();

        let fault = signature.request_object().unwrap().construct().unwrap_err();
        assert_eq!(fault.code(), 503);
    }

    #[test]
    fn multiple_request_objects_are_rejected() {
        let err = HandlerSignature::builder("merge")
            .request_object::<Input>("left")
            .request_object::<Input>("right")
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            SignatureError::MultipleRequestObjects {
                handler: "merge".to_string(),
                first: "left".to_string(),
                second: "right".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_parameter_names_are_rejected() {
        let err = HandlerSignature::builder("dup")
            .param::<u8>("x")
            .param::<u16>("x")
            .build()
            .unwrap_err();

        assert!(matches!(err, SignatureError::DuplicateParameter { .. }));
    }

    #[test]
    fn registry_rejects_duplicate_handlers() {
        let mut registry = SignatureRegistry::new();
        registry
            .register(HandlerSignature::builder("a").build().unwrap())
            .unwrap();

        let err = registry
            .register(HandlerSignature::builder("a").build().unwrap())
            .unwrap_err();

        assert_eq!(err, SignatureError::DuplicateHandler("a".to_string()));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("a").is_some());
        assert!(registry.get("b").is_none());
    }
}
