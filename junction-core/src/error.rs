//! Error model for junction
//!
//! Three layers of errors live here, kept deliberately separate:
//!
//! - [`ErrorCode`]: the fixed JSON-RPC 2.0 code/message table. The codes and
//!   default messages are part of the wire contract and must match exactly.
//! - [`Fault`]: a protocol fault raised while validating or dispatching one
//!   frame. It carries the request id it applies to and renders to an error
//!   frame via the table.
//! - [`HandlerError`]: an application fault raised by a handler body, rendered
//!   as code -32000 with the fault's own text as the message.
//!
//! [`Error`] is the crate-level error type (via `thiserror`) used by transport
//! and codec code paths; protocol faults fold into it with `#[from]`.
//!
//! # Wire contract
//!
//! | Code   | Message                    |
//! |--------|----------------------------|
//! | -32700 | Parse Error                |
//! | -32701 | Error while parsing result |
//! | -32600 | Invalid Request            |
//! | -32601 | Method Not Found           |
//! | -32602 | Invalid Params             |
//! | -32603 | Internal Error             |
//! | -32000 | Application Error          |

use crate::types::{Frame, Id};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error as ThisError;

/// Result type for junction operations
pub type Result<T> = std::result::Result<T, Error>;

/// The fixed JSON-RPC 2.0 error taxonomy.
///
/// Both the numeric codes and the default messages are wire contract; an
/// implementation is conformant only if they match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// -32700: invalid JSON was received
    ParseError,
    /// -32701: a result could not be serialized back onto the wire
    ParseResultError,
    /// -32600: the JSON sent is not a valid request object
    InvalidRequest,
    /// -32601: the method does not exist or is not available
    MethodNotFound,
    /// -32602: invalid method parameter(s)
    InvalidParams,
    /// -32603: internal JSON-RPC error
    InternalError,
    /// -32000: generic application error raised by a handler
    ApplicationError,
}

impl ErrorCode {
    /// The numeric wire code.
    pub const fn code(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::ParseResultError => -32701,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::ApplicationError => -32000,
        }
    }

    /// The default message associated with the code.
    pub const fn message(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse Error",
            ErrorCode::ParseResultError => "Error while parsing result",
            ErrorCode::InvalidRequest => "Invalid Request",
            ErrorCode::MethodNotFound => "Method Not Found",
            ErrorCode::InvalidParams => "Invalid Params",
            ErrorCode::InternalError => "Internal Error",
            ErrorCode::ApplicationError => "Application Error",
        }
    }

    /// Reverse lookup from a raw wire code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -32700 => Some(ErrorCode::ParseError),
            -32701 => Some(ErrorCode::ParseResultError),
            -32600 => Some(ErrorCode::InvalidRequest),
            -32601 => Some(ErrorCode::MethodNotFound),
            -32602 => Some(ErrorCode::InvalidParams),
            -32603 => Some(ErrorCode::InternalError),
            -32000 => Some(ErrorCode::ApplicationError),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

/// The nested `error` member of an error frame, as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Numeric error code from the taxonomy
    pub code: i32,
    /// Human-readable message, derived from the code for protocol faults
    pub message: String,
    /// Optional structured payload, omitted when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    /// Create a new error object.
    pub fn new(code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// A protocol fault raised while processing one inbound frame.
///
/// Carries the request id the fault applies to (best effort, may be absent
/// for malformed input), a code from the fixed taxonomy and optional data.
/// The message is always taken from the code table.
///
/// ```rust
/// use junction_core::{ErrorCode, Fault, Id};
///
/// let fault = Fault::new(Some(Id::Number(1)), ErrorCode::InvalidRequest);
/// let frame = fault.into_frame();
/// assert_eq!(frame.error.unwrap().message, "Invalid Request");
/// ```
#[derive(Debug, Clone)]
pub struct Fault {
    /// Id of the request that faulted, when one could be extracted
    pub id: Option<Id>,
    /// Code from the fixed taxonomy
    pub code: ErrorCode,
    /// Optional structured payload
    pub data: Option<Value>,
}

impl Fault {
    /// Create a fault with no data payload.
    pub fn new(id: Option<Id>, code: ErrorCode) -> Self {
        Self {
            id,
            code,
            data: None,
        }
    }

    /// Create a fault carrying a data payload.
    pub fn with_data(id: Option<Id>, code: ErrorCode, data: Option<Value>) -> Self {
        Self { id, code, data }
    }

    /// Render the fault into a conformant error frame.
    pub fn into_frame(self) -> Frame {
        Frame::error(self.id, self.code.code(), self.code.message(), self.data)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl std::error::Error for Fault {}

/// An application fault raised by a handler body.
///
/// Mirrors exception semantics at the dispatch boundary: the fault's textual
/// description becomes the error message, and its payload arguments become
/// the `data` member: the single argument itself when there is exactly one,
/// the full argument sequence otherwise.
///
/// ```rust
/// use junction_core::HandlerError;
/// use serde_json::json;
///
/// let err = HandlerError::with_args("bad state", vec![json!("bad state"), json!(true)]);
/// assert_eq!(err.data(), Some(json!(["bad state", true])));
/// ```
#[derive(Debug, Clone)]
pub struct HandlerError {
    message: String,
    args: Vec<Value>,
}

impl HandlerError {
    /// Create an application fault from a message. The message doubles as the
    /// single payload argument, so `data` echoes it.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let args = vec![Value::String(message.clone())];
        Self { message, args }
    }

    /// Create an application fault with explicit payload arguments.
    pub fn with_args(message: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            message: message.into(),
            args,
        }
    }

    /// The fault's textual description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The `data` payload: the single argument when there is exactly one,
    /// the full argument sequence otherwise.
    pub fn data(&self) -> Option<Value> {
        match self.args.len() {
            1 => Some(self.args[0].clone()),
            _ => Some(Value::Array(self.args.clone())),
        }
    }

    /// Render as an Application Error (-32000) frame keyed by `id`.
    pub fn into_frame(self, id: Option<Id>) -> Frame {
        let data = self.data();
        Frame::error(id, ErrorCode::ApplicationError.code(), self.message, data)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HandlerError {}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        HandlerError::new(message)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        HandlerError::new(message)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::new(err.to_string())
    }
}

/// Crate-level error type for junction operations.
#[derive(Debug, Clone, ThisError)]
pub enum Error {
    /// JSON-RPC protocol fault, already keyed to a request id
    #[error("JSON-RPC fault: {0}")]
    Fault(#[from] Fault),

    /// Serialization or deserialization failure outside the fault taxonomy
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// WebSocket transport layer error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(String),

    /// The connection is no longer active
    #[error("Connection closed")]
    ConnectionClosed,
}
