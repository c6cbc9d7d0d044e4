//! Handler traits and parameter shaping
//!
//! A [`Handler`] is the uniform call contract every registered method and
//! notification satisfies: it receives already-shaped [`Params`] plus a
//! [`Context`] and returns a boxed future. There is no runtime signature
//! inspection: a handler that wants the dispatcher context opts in by being
//! built with [`from_ctx_fn`]; everything else ignores it.
//!
//! # Creating handlers
//!
//! - [`from_fn`]: async closure over raw [`Params`]
//! - [`from_ctx_fn`]: same, plus the per-connection [`Context`]
//! - [`from_typed_fn`]: async closure over a `Deserialize` parameter type;
//!   binding failures surface through the generic application-fault path,
//!   the same way a native argument mismatch would
//!
//! # Why boxed futures?
//!
//! Different handlers have different concrete future types; the registry
//! needs a single storable type. Boxing is noise next to network I/O.

use crate::context::Context;
use junction_core::HandlerError;
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Parameters of one invocation, shaped before dispatch.
///
/// JSON-RPC allows `params` to be an ordered sequence or a key-value
/// mapping; an absent `params` member defaults to the empty sequence.
/// Anything else is rejected as Invalid Params by the dispatcher before a
/// handler ever runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// Positional parameters
    Array(Vec<Value>),
    /// Named parameters
    Map(Map<String, Value>),
}

impl Default for Params {
    /// The empty positional sequence, matching an absent `params` member.
    fn default() -> Self {
        Params::Array(Vec::new())
    }
}

impl Params {
    /// Whether no parameters were supplied.
    pub fn is_empty(&self) -> bool {
        match self {
            Params::Array(items) => items.is_empty(),
            Params::Map(entries) => entries.is_empty(),
        }
    }

    /// Recover the underlying JSON value, for typed deserialization.
    pub fn into_value(self) -> Value {
        match self {
            Params::Array(items) => Value::Array(items),
            Params::Map(entries) => Value::Object(entries),
        }
    }
}

/// Boxed future returned by handler invocations.
pub type HandlerFuture =
    Pin<Box<dyn Future<Output = std::result::Result<Value, HandlerError>> + Send>>;

/// Uniform call contract for registered methods and notifications.
///
/// Handlers must be `Send + Sync`: one entry may be invoked concurrently
/// from many connection tasks. Application failures are reported as
/// [`HandlerError`]; the dispatcher converts them to Application Error
/// (-32000) frames and never lets them escape further.
pub trait Handler: Send + Sync {
    /// Invoke the handler with shaped parameters and the connection context.
    fn call(&self, params: Params, ctx: Context) -> HandlerFuture;
}

struct FnHandler<F> {
    func: F,
}

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Value, HandlerError>> + Send + 'static,
{
    fn call(&self, params: Params, _ctx: Context) -> HandlerFuture {
        Box::pin((self.func)(params))
    }
}

struct CtxFnHandler<F> {
    func: F,
}

impl<F, Fut> Handler for CtxFnHandler<F>
where
    F: Fn(Params, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Value, HandlerError>> + Send + 'static,
{
    fn call(&self, params: Params, ctx: Context) -> HandlerFuture {
        Box::pin((self.func)(params, ctx))
    }
}

/// Create a handler from an async function over raw [`Params`].
///
/// ```rust
/// use junction_server::{from_fn, Params};
///
/// let handler = from_fn(|params: Params| async move {
///     Ok(serde_json::json!({"echo": params.into_value()}))
/// });
/// # let _ = handler;
/// ```
pub fn from_fn<F, Fut>(func: F) -> Box<dyn Handler>
where
    F: Fn(Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Value, HandlerError>> + Send + 'static,
{
    Box::new(FnHandler { func })
}

/// Create a handler that also receives the per-connection [`Context`].
///
/// This is the explicit opt-in for handlers that need connection state: the
/// session store or the push-notification channel.
///
/// ```rust
/// use junction_server::from_ctx_fn;
///
/// let handler = from_ctx_fn(|_params, ctx| async move {
///     ctx.notify("notification.ownnotif", Some(serde_json::json!({"payload": 12})))
///         .map_err(|e| junction_core::HandlerError::new(e.to_string()))?;
///     Ok(serde_json::json!(true))
/// });
/// # let _ = handler;
/// ```
pub fn from_ctx_fn<F, Fut>(func: F) -> Box<dyn Handler>
where
    F: Fn(Params, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Value, HandlerError>> + Send + 'static,
{
    Box::new(CtxFnHandler { func })
}

/// Create a handler with automatic parameter binding.
///
/// The shaped params are deserialized into `P` and the return value is
/// serialized back to JSON. A binding mismatch (wrong arity, wrong types,
/// unknown names) is an application fault, not Invalid Params: the method
/// was found and its params were structurally valid; what failed was the
/// call itself.
///
/// ```rust
/// use junction_server::from_typed_fn;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct AddParams { a: i64, b: i64 }
///
/// let handler = from_typed_fn(|p: AddParams| async move { Ok(p.a + p.b) });
/// # let _ = handler;
/// ```
pub fn from_typed_fn<P, R, F, Fut>(func: F) -> Box<dyn Handler>
where
    P: serde::de::DeserializeOwned + Send + 'static,
    R: serde::Serialize + Send + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<R, HandlerError>> + Send + 'static,
{
    let func = Arc::new(func);
    from_fn(move |params: Params| {
        let func = Arc::clone(&func);
        async move {
            let bound: P = serde_json::from_value(params.into_value())?;
            let result = func(bound).await?;
            serde_json::to_value(result).map_err(HandlerError::from)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Session;
    use crate::registry::Transport;
    use serde::Deserialize;
    use serde_json::json;

    fn test_ctx() -> Context {
        Context::new(Transport::Duplex, Session::new())
    }

    #[tokio::test]
    async fn test_from_fn_receives_params() {
        let handler = from_fn(|params: Params| async move { Ok(params.into_value()) });
        let result = handler
            .call(Params::Array(vec![json!(1), json!(2)]), test_ctx())
            .await
            .unwrap();
        assert_eq!(result, json!([1, 2]));
    }

    #[tokio::test]
    async fn test_from_typed_fn_binds_named_params() {
        #[derive(Deserialize)]
        struct AddParams {
            a: i64,
            b: i64,
        }
        let handler = from_typed_fn(|p: AddParams| async move { Ok(p.a + p.b) });

        let mut map = Map::new();
        map.insert("a".to_string(), json!(5));
        map.insert("b".to_string(), json!(3));
        let result = handler.call(Params::Map(map), test_ctx()).await.unwrap();
        assert_eq!(result, json!(8));
    }

    #[tokio::test]
    async fn test_from_typed_fn_binding_mismatch_is_application_fault() {
        #[derive(Deserialize)]
        struct OneParam {
            #[allow(dead_code)]
            test: String,
        }
        let handler = from_typed_fn(|_: OneParam| async move { Ok(json!("pong2")) });

        let err = handler
            .call(Params::Array(vec![json!(1), json!(2)]), test_ctx())
            .await
            .unwrap_err();
        assert!(!err.message().is_empty());
    }

    #[test]
    fn test_default_params_is_empty_sequence() {
        assert_eq!(Params::default(), Params::Array(Vec::new()));
        assert!(Params::default().is_empty());
    }
}
