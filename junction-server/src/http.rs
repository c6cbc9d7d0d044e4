//! Single-shot request/response adapter
//!
//! The duplex pipeline reused over a one-request, one-response channel.
//! [`handle_body`] takes the raw request body and produces an [`HttpReply`]:
//! a status code plus an optional JSON body. The surrounding HTTP plumbing
//! (routing, headers, framing) is the embedding application's concern; this
//! module only decides what a conformant reply looks like.
//!
//! # Status mapping
//!
//! The frame stays authoritative; the status code restates its error class
//! for clients that only look at the status line:
//!
//! - success frame: 200
//! - Invalid Request: 400
//! - Method Not Found: 404
//! - any other error frame: 500
//! - notification (no frame at all): 204, empty body

use crate::context::{Context, Session};
use crate::dispatch::Dispatcher;
use crate::registry::Transport;
use junction_core::{codec, Error, ErrorCode, Fault, Frame, Result};

/// Outcome of one single-shot exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    /// HTTP status code restating the frame's class
    pub status: u16,
    /// Serialized reply frame; absent for notifications
    pub body: Option<String>,
}

impl HttpReply {
    fn with_frame(status: u16, frame: &Frame) -> Result<Self> {
        Ok(Self {
            status,
            body: Some(codec::encode(frame)?),
        })
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }
}

/// Map a JSON-RPC error code to the status line restating it.
pub fn status_for_code(code: i32) -> u16 {
    match ErrorCode::from_code(code) {
        Some(ErrorCode::InvalidRequest) => 400,
        Some(ErrorCode::MethodNotFound) => 404,
        _ => 500,
    }
}

/// Process one request body and shape the reply.
///
/// An empty or whitespace-only body never reaches the parser: there is no
/// JSON to parse, so the failure is Invalid Request (400), not Parse Error.
pub async fn handle_body(body: &str, dispatcher: &Dispatcher, session: Session) -> Result<HttpReply> {
    if body.trim().is_empty() {
        let frame = Fault::new(None, ErrorCode::InvalidRequest).into_frame();
        return HttpReply::with_frame(400, &frame);
    }

    let raw = match codec::decode(body) {
        Ok(raw) => raw,
        Err(Error::Fault(fault)) => {
            let frame = fault.into_frame();
            return HttpReply::with_frame(500, &frame);
        }
        Err(e) => return Err(e),
    };

    let ctx = Context::new(Transport::RequestResponse, session);
    let (frame, _is_notification) = dispatcher
        .process(raw, Transport::RequestResponse, ctx)
        .await;

    match frame {
        None => Ok(HttpReply::no_content()),
        Some(frame) => {
            let status = match &frame.error {
                Some(error) => status_for_code(error.code),
                None => 200,
            };
            HttpReply::with_frame(status, &frame)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::from_fn;
    use crate::registry::Capabilities;
    use serde_json::{json, Value};

    fn dispatcher() -> Dispatcher {
        let dispatcher = Dispatcher::new();
        dispatcher.method("ping", from_fn(|_| async { Ok(json!("pong")) }));
        dispatcher.notification("notif1", from_fn(|_| async { Ok(Value::Null) }));
        dispatcher
    }

    async fn reply(body: &str) -> HttpReply {
        handle_body(body, &dispatcher(), Session::new()).await.unwrap()
    }

    fn body_json(reply: &HttpReply) -> Value {
        serde_json::from_str(reply.body.as_deref().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_call_is_200_with_result() {
        let reply = reply(r#"{"id":1,"jsonrpc":"2.0","method":"ping","params":[]}"#).await;
        assert_eq!(reply.status, 200);
        assert_eq!(
            body_json(&reply),
            json!({"id": 1, "jsonrpc": "2.0", "result": "pong"})
        );
    }

    #[tokio::test]
    async fn test_notification_is_204_without_body() {
        let reply = reply(r#"{"jsonrpc":"2.0","method":"notif1","params":{}}"#).await;
        assert_eq!(reply, HttpReply { status: 204, body: None });
    }

    #[tokio::test]
    async fn test_empty_body_is_400_invalid_request() {
        for body in ["", "   ", "\n"] {
            let reply = reply(body).await;
            assert_eq!(reply.status, 400);
            assert_eq!(body_json(&reply)["error"]["code"], json!(-32600));
        }
    }

    #[tokio::test]
    async fn test_garbage_body_is_500_parse_error() {
        let reply = reply("sqwdw").await;
        assert_eq!(reply.status, 500);
        assert_eq!(
            body_json(&reply),
            json!({"jsonrpc": "2.0", "error": {"code": -32700, "message": "Parse Error"}})
        );
    }

    #[tokio::test]
    async fn test_unknown_method_is_404() {
        let reply = reply(r#"{"id":1,"jsonrpc":"2.0","method":"nosuch"}"#).await;
        assert_eq!(reply.status, 404);
        assert_eq!(body_json(&reply)["error"]["code"], json!(-32601));
    }

    #[tokio::test]
    async fn test_duplex_only_method_is_404_here() {
        let dispatcher = Dispatcher::new();
        dispatcher.method_with(
            "ws_only",
            Capabilities::duplex_only(),
            from_fn(|_| async { Ok(json!(true)) }),
        );
        let reply = handle_body(
            r#"{"id":1,"jsonrpc":"2.0","method":"ws_only"}"#,
            &dispatcher,
            Session::new(),
        )
        .await
        .unwrap();
        assert_eq!(reply.status, 404);
    }

    #[tokio::test]
    async fn test_application_error_is_500() {
        let dispatcher = Dispatcher::new();
        dispatcher.method(
            "fails",
            from_fn(|_| async { Err(junction_core::HandlerError::new("boom")) }),
        );
        let reply = handle_body(
            r#"{"id":1,"jsonrpc":"2.0","method":"fails"}"#,
            &dispatcher,
            Session::new(),
        )
        .await
        .unwrap();
        assert_eq!(reply.status, 500);
        assert_eq!(body_json(&reply)["error"]["code"], json!(-32000));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for_code(-32600), 400);
        assert_eq!(status_for_code(-32601), 404);
        assert_eq!(status_for_code(-32700), 500);
        assert_eq!(status_for_code(-32000), 500);
        assert_eq!(status_for_code(-1), 500);
    }
}
