//! Server builder
//!
//! The builder provides a fluent API for configuring and creating a
//! [`JunctionServer`]: set the bind address, register method and
//! notification handlers (with optional transport capability flags), or
//! supply a pre-built dispatcher wholesale.
//!
//! # Examples
//!
//! ```rust,no_run
//! use junction_server::{JunctionServer, from_fn};
//!
//! # async fn example() -> junction_core::Result<()> {
//! let server = JunctionServer::builder()
//!     .bind_str("127.0.0.1:8080")?
//!     .method("ping", from_fn(|_| async {
//!         Ok(serde_json::json!("pong"))
//!     }))
//!     .build()
//!     .await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

use crate::dispatch::Dispatcher;
use crate::duplex::{Peer, PeerHook};
use crate::handler::Handler;
use crate::registry::Capabilities;
use crate::JunctionServer;
use junction_core::{Error, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for constructing a [`JunctionServer`]
pub struct ServerBuilder {
    addr: Option<SocketAddr>,
    dispatcher: Dispatcher,
    on_connect: Option<PeerHook>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            addr: None,
            dispatcher: Dispatcher::new(),
            on_connect: None,
        }
    }

    /// Set the bind address for the server
    pub fn bind(mut self, addr: impl Into<SocketAddr>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    /// Set the bind address from a string (e.g., "127.0.0.1:8080")
    pub fn bind_str(mut self, addr: &str) -> Result<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::Io(format!("Invalid address: {}", e)))?;
        self.addr = Some(addr);
        Ok(self)
    }

    /// Register a method handler
    pub fn method(self, name: impl Into<String>, handler: Box<dyn Handler>) -> Self {
        self.dispatcher.method(name, handler);
        self
    }

    /// Register a method handler with explicit transport capabilities
    pub fn method_with(
        self,
        name: impl Into<String>,
        caps: Capabilities,
        handler: Box<dyn Handler>,
    ) -> Self {
        self.dispatcher.method_with(name, caps, handler);
        self
    }

    /// Register a notification handler
    pub fn notification(self, name: impl Into<String>, handler: Box<dyn Handler>) -> Self {
        self.dispatcher.notification(name, handler);
        self
    }

    /// Register a notification handler with explicit transport capabilities
    pub fn notification_with(
        self,
        name: impl Into<String>,
        caps: Capabilities,
        handler: Box<dyn Handler>,
    ) -> Self {
        self.dispatcher.notification_with(name, caps, handler);
        self
    }

    /// Set the dispatcher (replaces any previously registered handlers)
    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Register a callback invoked with a [`Peer`] handle for every accepted
    /// connection, enabling pushes independent of any inbound call
    pub fn on_connect<F>(mut self, hook: F) -> Self
    where
        F: Fn(Peer) + Send + Sync + 'static,
    {
        self.on_connect = Some(Arc::new(hook));
        self
    }

    /// Build the server, binding the TCP listener
    pub async fn build(self) -> Result<JunctionServer> {
        let addr = self
            .addr
            .ok_or_else(|| Error::Io("No bind address specified".to_string()))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Io(e.to_string()))?;

        tracing::info!(addr = %addr, "Server listening");

        Ok(JunctionServer {
            listener,
            dispatcher: self.dispatcher,
            on_connect: self.on_connect,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::from_fn;

    #[tokio::test]
    async fn test_builder_basic() {
        let handler = from_fn(|_| async { Ok(serde_json::json!("pong")) });

        let server = ServerBuilder::new()
            .bind_str("127.0.0.1:0")
            .unwrap()
            .method("ping", handler)
            .build()
            .await
            .unwrap();

        assert_eq!(server.dispatcher().registry().method_names(), vec!["ping"]);
        assert!(server.local_addr().is_ok());
    }

    #[tokio::test]
    async fn test_builder_no_address() {
        let result = ServerBuilder::new().build().await;
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_bind_str_invalid() {
        assert!(ServerBuilder::new().bind_str("invalid:address").is_err());
    }

    #[tokio::test]
    async fn test_builder_replaces_dispatcher() {
        let dispatcher = Dispatcher::new();
        dispatcher.notification("notif1", from_fn(|_| async { Ok(serde_json::Value::Null) }));

        let server = ServerBuilder::new()
            .bind_str("127.0.0.1:0")
            .unwrap()
            .method("dropped", from_fn(|_| async { Ok(serde_json::json!(1)) }))
            .dispatcher(dispatcher)
            .build()
            .await
            .unwrap();

        assert!(server.dispatcher().registry().method_names().is_empty());
        assert_eq!(
            server.dispatcher().registry().notification_names(),
            vec!["notif1"]
        );
    }
}
