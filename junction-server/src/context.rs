//! Per-connection dispatcher context
//!
//! Handlers built with `from_ctx_fn` receive a [`Context`]: a cheap,
//! cloneable handle onto the connection the current frame arrived on. It
//! exposes the transport kind, a shared [`Session`] store, and (on duplex
//! connections) the ability to push server-initiated notifications at any
//! time, independent of any inbound call.

use crate::registry::Transport;
use junction_core::{codec, Error, Frame, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

/// Key-value session state shared by all frames of one connection.
///
/// Cloning shares the underlying store. For single-shot transports the
/// collaborator decides how long a session outlives one request.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<HashMap<String, Value>>>,
}

impl Session {
    /// Create an empty session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `key`, replacing any previous one.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.write().insert(key.into(), value);
    }

    /// Fetch a clone of the value under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Value>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Handle onto the connection a frame arrived on, passed to opted-in
/// handlers.
#[derive(Clone)]
pub struct Context {
    transport: Transport,
    session: Session,
    outbound: Option<mpsc::UnboundedSender<String>>,
}

impl Context {
    /// Context without a push channel (request-response transports, tests).
    pub fn new(transport: Transport, session: Session) -> Self {
        Self {
            transport,
            session,
            outbound: None,
        }
    }

    /// Context bound to a duplex connection's outbound channel.
    pub fn with_outbound(
        transport: Transport,
        session: Session,
        outbound: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            transport,
            session,
            outbound: Some(outbound),
        }
    }

    /// The kind of channel the current frame arrived on.
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// The connection's session store.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Push a server-initiated notification to the connected client.
    ///
    /// Builds a request-shaped frame (no id by construction) and sends it
    /// unsolicited. Fails with [`Error::ConnectionClosed`] when the
    /// connection has no outbound channel; single-shot transports cannot
    /// push.
    pub fn notify(&self, method: impl Into<String>, params: Option<Value>) -> Result<()> {
        let frame = Frame::request(method, params);
        let text = codec::encode(&frame)?;
        match &self.outbound {
            Some(tx) => tx.send(text).map_err(|_| Error::ConnectionClosed),
            None => Err(Error::ConnectionClosed),
        }
    }
}
