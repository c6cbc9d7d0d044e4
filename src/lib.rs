//! junction - JSON-RPC 2.0 dispatch over duplex and single-shot transports
//!
//! This is the main convenience crate that re-exports all junction
//! sub-crates. Use this crate if you want a single dependency providing the
//! wire types and the server.
//!
//! # Architecture
//!
//! junction is organized into modular crates:
//!
//! - **junction-core**: envelope types, error model, codec
//! - **junction-server**: registries, dispatcher, WebSocket and
//!   request/response adapters
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use junction::JunctionServer;
//! use junction::server::from_typed_fn;
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

// Re-export all public APIs from sub-crates
// This allows users to access everything through the `junction::` prefix
pub use junction_core as core;
pub use junction_server as server;

// Convenience re-exports of the most commonly used types
pub use junction_core::{Error, Frame, HandlerError, Id, Result};
pub use junction_server::JunctionServer;
