//! Frame dispatch
//!
//! [`Dispatcher`] turns one decoded inbound value into at most one outbound
//! [`Frame`], independent of any transport. The pipeline is:
//!
//! 1. shape validation ([`crate::validate`])
//! 2. call/notification classification from the extracted id
//! 3. handler resolution against the registry, gated by transport
//!    capabilities
//! 4. params shaping and handler invocation
//!
//! # Response discipline
//!
//! A call is answered exactly once, with a success or an error frame. A
//! notification is never answered on success, and faults that occur *after*
//! classification (unknown name, bad params, handler failure) are suppressed
//! from the wire and logged instead. Validation faults precede
//! classification: a frame too malformed to classify is always answered.

use crate::context::Context;
use crate::handler::{Handler, Params};
use crate::registry::{Capabilities, Entry, Registry, Transport};
use crate::validate::{extract_id, validate};
use junction_core::{ErrorCode, Fault, Frame, HandlerError, Id};
use serde_json::Value;

enum DispatchError {
    Fault(Fault),
    Handler(HandlerError),
}

impl From<Fault> for DispatchError {
    fn from(fault: Fault) -> Self {
        DispatchError::Fault(fault)
    }
}

impl From<HandlerError> for DispatchError {
    fn from(err: HandlerError) -> Self {
        DispatchError::Handler(err)
    }
}

/// Transport-independent dispatch engine over one [`Registry`].
///
/// Cloning shares the registry; the transport adapters hold clones of the
/// same dispatcher.
#[derive(Clone, Default)]
pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    /// Create a dispatcher with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The dispatcher's registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a method handler under `name`.
    pub fn method(&self, name: impl Into<String>, handler: Box<dyn Handler>) -> &Self {
        self.registry.register_method(name, handler);
        self
    }

    /// Register a method handler with explicit capability flags.
    pub fn method_with(
        &self,
        name: impl Into<String>,
        caps: Capabilities,
        handler: Box<dyn Handler>,
    ) -> &Self {
        self.registry.register_method_with(name, caps, handler);
        self
    }

    /// Register a notification handler under `name`.
    pub fn notification(&self, name: impl Into<String>, handler: Box<dyn Handler>) -> &Self {
        self.registry.register_notification(name, handler);
        self
    }

    /// Register a notification handler with explicit capability flags.
    pub fn notification_with(
        &self,
        name: impl Into<String>,
        caps: Capabilities,
        handler: Box<dyn Handler>,
    ) -> &Self {
        self.registry
            .register_notification_with(name, caps, handler);
        self
    }

    /// Process one decoded inbound value.
    ///
    /// Returns the frame to send back (if any) and whether the inbound was
    /// classified as a notification. Callers use the flag to distinguish "no
    /// frame because notification" from cases where they themselves must
    /// fabricate a reply.
    pub async fn process(
        &self,
        raw: Value,
        transport: Transport,
        ctx: Context,
    ) -> (Option<Frame>, bool) {
        // Top-level arrays would be batch requests; those are not supported
        // and fail as one malformed request.
        if raw.is_array() {
            let fault = Fault::new(None, ErrorCode::InvalidRequest);
            return (Some(fault.into_frame()), false);
        }

        if let Err(fault) = validate(&raw) {
            return (Some(fault.into_frame()), false);
        }

        let id = extract_id(&raw).filter(|id| !id.is_falsy());
        let is_notification = id.is_none();
        // validate() guarantees a non-empty string method.
        let method = raw
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match self
            .invoke(&raw, &method, transport, id.clone(), is_notification, ctx)
            .await
        {
            Ok(result) => {
                if is_notification {
                    if !result.is_null() {
                        tracing::warn!(method = %method, "notification handler returned a value, discarding");
                    }
                    (None, true)
                } else {
                    (Some(Frame::success(result, id)), false)
                }
            }
            Err(error) if is_notification => {
                match &error {
                    DispatchError::Fault(fault) => {
                        tracing::warn!(method = %method, fault = %fault, "notification faulted, not answering")
                    }
                    DispatchError::Handler(err) => {
                        tracing::warn!(method = %method, error = %err, "notification handler failed, not answering")
                    }
                }
                (None, true)
            }
            Err(DispatchError::Fault(fault)) => (Some(fault.into_frame()), false),
            Err(DispatchError::Handler(err)) => (Some(err.into_frame(id)), false),
        }
    }

    async fn invoke(
        &self,
        raw: &Value,
        method: &str,
        transport: Transport,
        id: Option<Id>,
        is_notification: bool,
        ctx: Context,
    ) -> Result<Value, DispatchError> {
        let entry = self.resolve(method, is_notification, transport, id.clone())?;
        let params = extract_params(raw, id)?;
        let result = entry.handler.call(params, ctx).await?;
        Ok(result)
    }

    /// Resolve a name to a registered entry the given transport may invoke.
    ///
    /// An unregistered name and a capability mismatch produce the same
    /// Method Not Found fault; callers cannot probe for the existence of
    /// methods a transport is not allowed to reach.
    fn resolve(
        &self,
        method: &str,
        is_notification: bool,
        transport: Transport,
        id: Option<Id>,
    ) -> Result<Entry, Fault> {
        match self.registry.lookup(method, is_notification) {
            Some(entry) if entry.caps.allows(transport) => Ok(entry),
            _ => Err(Fault::new(id, ErrorCode::MethodNotFound)),
        }
    }
}

/// Shape the `params` member into [`Params`].
///
/// Absent params default to the empty sequence. A present member that is
/// neither a sequence nor a mapping (including `null`) is Invalid Params.
fn extract_params(raw: &Value, id: Option<Id>) -> Result<Params, Fault> {
    match raw.get("params") {
        None => Ok(Params::default()),
        Some(Value::Array(items)) => Ok(Params::Array(items.clone())),
        Some(Value::Object(entries)) => Ok(Params::Map(entries.clone())),
        Some(_) => Err(Fault::new(id, ErrorCode::InvalidParams)),
    }
}
