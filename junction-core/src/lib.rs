//! Core JSON-RPC 2.0 types, error model and codec for junction
//!
//! This crate holds everything the dispatch layer needs that is independent
//! of any transport:
//!
//! - **types**: the [`Id`] and [`Frame`] envelope types
//! - **error**: the fixed error-code table, protocol faults and application
//!   faults
//! - **codec**: decoding inbound text into JSON values and encoding outbound
//!   frames
//!
//! The dispatch engine itself, the registries and the transport adapters live
//! in `junction-server`.

pub mod codec;
pub mod error;
pub mod types;

pub use error::{Error, ErrorCode, ErrorObject, Fault, HandlerError, Result};
pub use types::{Frame, Id};
