//! JSON-RPC 2.0 request shape validation
//!
//! [`validate`] checks a decoded value against the request shape rules before
//! dispatch is attempted, failing fast with the first applicable fault. Order
//! of checks: mapping, `jsonrpc` version, `method` presence and type, private
//! name marker. Any structural deviation yields Invalid Request; a private
//! name yields Method Not Found. Privacy is modeled as absence, not
//! malformation, so callers cannot distinguish hidden methods from missing
//! ones.
//!
//! Id extraction is best effort and never fails: whatever id can be read from
//! the raw payload keys the resulting error frame.

use junction_core::{ErrorCode, Fault, Id};
use serde_json::Value;

/// Marker prefix for private handler names. Such names always resolve as
/// not-found regardless of registration.
pub const PRIVATE_PREFIX: char = '_';

/// Extract the request id from a raw payload, best effort.
///
/// Strings and integral numbers map to their dedicated [`Id`] variants; any
/// other non-null value is carried opaquely so it can be echoed back
/// unchanged. A missing key, an explicit `null` and a non-object payload all
/// read as absent. Never fails.
pub fn extract_id(value: &Value) -> Option<Id> {
    match value.as_object()?.get("id")? {
        Value::Null => None,
        Value::String(s) => Some(Id::String(s.clone())),
        Value::Number(n) => Some(match n.as_i64() {
            Some(number) => Id::Number(number),
            None => Id::Other(Value::Number(n.clone())),
        }),
        other => Some(Id::Other(other.clone())),
    }
}

/// Check a decoded value against the JSON-RPC 2.0 request shape rules.
///
/// Top-level arrays and null are the dispatcher's concern and must be
/// rejected before calling this.
pub fn validate(value: &Value) -> std::result::Result<(), Fault> {
    let request = match value.as_object() {
        Some(map) => map,
        None => return Err(Fault::new(None, ErrorCode::InvalidRequest)),
    };

    let id = extract_id(value);

    if request.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err(Fault::new(id, ErrorCode::InvalidRequest));
    }

    let method = match request.get("method") {
        Some(Value::String(name)) if !name.is_empty() => name,
        _ => return Err(Fault::new(id, ErrorCode::InvalidRequest)),
    };

    if method.starts_with(PRIVATE_PREFIX) {
        return Err(Fault::new(id, ErrorCode::MethodNotFound));
    }

    Ok(())
}
