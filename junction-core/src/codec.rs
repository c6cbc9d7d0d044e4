//! Text-frame codec boundary
//!
//! The dispatch engine consumes already-decoded JSON values and emits
//! [`Frame`]s; this module is the thin boundary between those values and the
//! text frames a transport actually moves.
//!
//! Decode failures map to a Parse Error fault (-32700) with no id: the id
//! cannot be trusted out of undecodable text. Encode failures surface as
//! [`Error::Serialization`]; the transport adapters convert them into a
//! "Error while parsing result" frame (-32701) so a bad result never kills
//! the connection.

use crate::error::{Error, ErrorCode, Fault, Result};
use crate::types::Frame;
use serde_json::Value;

/// Decode one inbound text frame into a JSON value.
///
/// # Errors
///
/// Returns a [`Fault`] with code -32700 and no id when the text is not valid
/// JSON.
///
/// ```rust
/// use junction_core::codec;
///
/// assert!(codec::decode(r#"{"jsonrpc":"2.0","method":"ping","id":1}"#).is_ok());
/// assert!(codec::decode("not json").is_err());
/// ```
pub fn decode(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|_| Error::Fault(Fault::new(None, ErrorCode::ParseError)))
}

/// Encode an outbound frame to text.
///
/// # Errors
///
/// Returns [`Error::Serialization`] when the frame cannot be rendered as
/// JSON. With plain [`serde_json::Value`] payloads this does not happen in
/// practice, but the adapters still guard the path.
pub fn encode(frame: &Frame) -> Result<String> {
    serde_json::to_string(frame).map_err(|e| Error::Serialization(e.to_string()))
}
