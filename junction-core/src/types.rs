//! JSON-RPC 2.0 envelope types
//!
//! This module implements the wire-level data structures from the JSON-RPC 2.0
//! specification (https://www.jsonrpc.org/specification):
//!
//! - **Id**: the opaque request identifier used to correlate calls with responses
//! - **Frame**: a single envelope type covering request-shaped, result-shaped
//!   and error-shaped messages
//! - **ErrorObject**: the nested `error` member of an error frame
//!
//! # Calls vs notifications
//!
//! A request carrying an id is a *call* and expects exactly one response. A
//! request without an id (or with a falsy one, see [`Id::is_falsy`]) is a
//! *notification* and must never receive a response on success. Server-initiated
//! pushes reuse the request shape and never carry an id.
//!
//! # Id echoing
//!
//! A response's id must match the request's id byte for byte, including its
//! JSON type: numeric ids stay numeric, string ids stay strings. When no id
//! could be extracted from a malformed request, the `id` member is omitted
//! from the error frame entirely (not serialized as `null`).

use crate::error::ErrorObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// JSON-RPC 2.0 request ID
///
/// Per the spec an id can be a string, a number, or null, but the value is
/// opaque: whatever the client sent must be echoed back unchanged, so ids
/// outside the common shapes (fractional numbers, booleans, containers) are
/// carried as-is in [`Id::Other`]. The enum is `#[serde(untagged)]` so it
/// serializes directly as the inner value.
///
/// # Examples
///
/// ```rust
/// use junction_core::Id;
///
/// let id1: Id = "req-123".into();
/// let id2: Id = 42i64.into();
///
/// assert_eq!(id1.to_string(), "\"req-123\"");
/// assert_eq!(id2.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier, useful for UUIDs or correlation tokens
    String(String),
    /// Numeric identifier, efficient for sequential request counters
    Number(i64),
    /// Null identifier, allowed by the spec but not recommended
    Null,
    /// Any other JSON value used as an id, echoed back opaquely
    Other(Value),
}

impl Id {
    /// Whether this id classifies the carrying request as a notification.
    ///
    /// A request whose id is absent *or falsy* is treated as a notification:
    /// `null`, the number `0` (integral or not), `false`, the empty string
    /// and empty containers all count as falsy. Everything else, including
    /// fractional numbers and `true`, is a call. This mirrors the upstream
    /// wire truthiness behavior rather than the letter of the spec.
    ///
    /// ```rust
    /// use junction_core::Id;
    ///
    /// assert!(Id::Number(0).is_falsy());
    /// assert!(Id::String(String::new()).is_falsy());
    /// assert!(!Id::Number(1).is_falsy());
    /// ```
    pub fn is_falsy(&self) -> bool {
        match self {
            Id::String(s) => s.is_empty(),
            Id::Number(n) => *n == 0,
            Id::Null => true,
            Id::Other(value) => match value {
                Value::Null => true,
                Value::Bool(b) => !b,
                Value::Number(n) => n.as_f64() == Some(0.0),
                Value::String(s) => s.is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::Object(entries) => entries.is_empty(),
            },
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
            Id::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

/// A single JSON-RPC 2.0 envelope
///
/// One struct covers all three outbound shapes. The constructors guarantee
/// that only one of the mutually exclusive members is populated:
///
/// - [`Frame::request`]: method + params, no id (server-initiated push)
/// - [`Frame::success`]: result keyed by the request id
/// - [`Frame::error`]: nested [`ErrorObject`] keyed by the request id
///
/// Absent members are omitted from the serialized form, so an error frame for
/// a request whose id could not be extracted is exactly
/// `{"jsonrpc":"2.0","error":{...}}`.
///
/// # Examples
///
/// ```rust
/// use junction_core::{Frame, Id};
/// use serde_json::json;
///
/// let push = Frame::request("status.changed", Some(json!({"online": true})));
/// assert!(push.id.is_none());
///
/// let reply = Frame::success(json!("pong"), Some(Id::Number(1)));
/// assert!(reply.error.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// JSON-RPC version, always "2.0"
    pub jsonrpc: String,
    /// Request id, echoed from the inbound call; omitted when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// Method name, present only on request-shaped frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Parameters accompanying a request-shaped frame
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Call result, mutually exclusive with `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object, mutually exclusive with `result`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl Frame {
    /// Shared builder behind the public constructors.
    ///
    /// When more than one of method/result/error is supplied, a method-shaped
    /// frame wins over a result-shaped one, which wins over an error-shaped
    /// one. In practice callers only ever populate one.
    fn build(
        id: Option<Id>,
        method: Option<String>,
        params: Option<Value>,
        result: Option<Value>,
        error: Option<ErrorObject>,
    ) -> Self {
        let mut frame = Frame {
            jsonrpc: "2.0".to_string(),
            id,
            method: None,
            params: None,
            result: None,
            error: None,
        };
        if let Some(method) = method {
            frame.method = Some(method);
            frame.params = params;
        } else if let Some(result) = result {
            frame.result = Some(result);
        } else if let Some(error) = error {
            frame.error = Some(error);
        }
        frame
    }

    /// Build a request-shaped frame for a server-initiated notification.
    ///
    /// The id is absent by construction: pushes never expect a response.
    pub fn request(method: impl Into<String>, params: Option<Value>) -> Self {
        Self::build(None, Some(method.into()), params, None, None)
    }

    /// Build a success response carrying `result`, keyed by the request id.
    pub fn success(result: Value, id: Option<Id>) -> Self {
        Self::build(id, None, None, Some(result), None)
    }

    /// Build an error response with the given code, message and optional data.
    pub fn error(
        id: Option<Id>,
        code: i32,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self::build(id, None, None, None, Some(ErrorObject::new(code, message, data)))
    }

    /// Whether this frame carries a result.
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    /// Whether this frame carries an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
