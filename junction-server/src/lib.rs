//! JSON-RPC 2.0 dispatch engine with duplex and single-shot transports
//!
//! This crate routes JSON-RPC 2.0 frames to registered handlers over two
//! kinds of channels: persistent WebSocket connections (the primary,
//! bidirectional transport) and single-shot request/response exchanges such
//! as plain HTTP (a secondary adapter over the same pipeline).
//!
//! # Core Features
//!
//! - **Method and notification registries**: separate name tables per
//!   dispatcher, with per-entry transport capability flags
//! - **Conformant error model**: the fixed JSON-RPC code table, byte-for-byte
//!   id echoing, and strict notification silence
//! - **Server push**: handlers on duplex connections can emit
//!   server-initiated notifications at any time via [`Context::notify`]
//! - **Session state**: a per-connection key-value store shared by all
//!   frames of one connection
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use junction_server::{JunctionServer, from_typed_fn};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct AddParams { a: i64, b: i64 }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = JunctionServer::builder()
//!         .bind_str("127.0.0.1:8080")?
//!         .method("add", from_typed_fn(|p: AddParams| async move {
//!             Ok(p.a + p.b)
//!         }))
//!         .build()
//!         .await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Each accepted connection runs in its own Tokio task with a fresh
//! [`Session`]; within a connection, a receive task and a send task decouple
//! frame processing from client writes. The [`Dispatcher`] itself is
//! transport-agnostic: the WebSocket adapter ([`serve_connection`]) and the
//! request/response adapter ([`handle_body`]) feed the same pipeline and
//! differ only in how replies leave the process.

mod builder;
mod context;
mod dispatch;
mod duplex;
mod handler;
mod http;
mod registry;
mod validate;

pub use builder::ServerBuilder;
pub use context::{Context, Session};
pub use dispatch::Dispatcher;
pub use duplex::{serve_connection, Peer, PeerHook};
pub use handler::{from_ctx_fn, from_fn, from_typed_fn, Handler, HandlerFuture, Params};
pub use http::{handle_body, status_for_code, HttpReply};
pub use registry::{Capabilities, Entry, Registry, Transport};
pub use validate::{extract_id, validate, PRIVATE_PREFIX};

use junction_core::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpListener;

/// JSON-RPC 2.0 server over WebSocket
///
/// Owns the TCP listener and the dispatcher. Build one with
/// [`JunctionServer::builder`], then call [`run`](JunctionServer::run) to
/// accept connections until an accept error occurs.
pub struct JunctionServer {
    /// TCP listener for accepting incoming connections
    listener: TcpListener,
    /// Dispatcher shared by all connections
    dispatcher: Dispatcher,
    /// Optional callback handed a [`Peer`] for every accepted connection
    on_connect: Option<PeerHook>,
}

impl JunctionServer {
    /// Create a new server builder
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// The address the listener is bound to
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.listener.local_addr().map_err(|e| Error::Io(e.to_string()))
    }

    /// The server's dispatcher
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run the accept loop.
    ///
    /// Each accepted connection gets a unique id, a fresh [`Session`] and its
    /// own task running [`serve_connection`]. Connection failures are logged
    /// and do not affect other connections; only an accept failure ends the
    /// loop.
    #[tracing::instrument(skip(self), name = "server.run")]
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Starting junction server");
        let conn_counter = AtomicU64::new(0);

        loop {
            let (stream, addr) = self
                .listener
                .accept()
                .await
                .map_err(|e| Error::Io(e.to_string()))?;
            let conn_id = conn_counter.fetch_add(1, Ordering::SeqCst);
            let dispatcher = self.dispatcher.clone();
            let on_connect = self.on_connect.clone();

            tracing::info!(conn_id = conn_id, addr = %addr, "New connection accepted");

            tokio::spawn(async move {
                let session = Session::new();
                if let Err(e) =
                    serve_connection(stream, conn_id, dispatcher, session, on_connect).await
                {
                    tracing::error!(conn_id = conn_id, error = %e, "Connection error");
                }
            });
        }
    }
}
