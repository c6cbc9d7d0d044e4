//! End-to-end dispatch pipeline tests
//!
//! Drives `Dispatcher::process` directly with raw JSON values, covering the
//! response discipline for calls and notifications across both transport
//! kinds.

use junction_core::{Frame, HandlerError, Id};
use junction_server::{
    from_ctx_fn, from_fn, from_typed_fn, Capabilities, Context, Dispatcher, Params, Session,
    Transport,
};
use serde_json::{json, Value};

fn ctx(transport: Transport) -> Context {
    Context::new(transport, Session::new())
}

fn dispatcher() -> Dispatcher {
    let d = Dispatcher::new();
    d.method(
        "ping",
        from_typed_fn(|fail: (bool,)| async move {
            if fail.0 {
                Err(HandlerError::new("pong_with_error"))
            } else {
                Ok(json!("pong"))
            }
        }),
    );
    d.method(
        "echo",
        from_fn(|params: Params| async move { Ok(params.into_value()) }),
    );
    d.notification("notif1", from_fn(|_| async { Ok(Value::Null) }));
    d
}

async fn duplex(d: &Dispatcher, raw: Value) -> (Option<Frame>, bool) {
    d.process(raw, Transport::Duplex, ctx(Transport::Duplex)).await
}

#[tokio::test]
async fn test_ping_pong() {
    let d = dispatcher();
    let raw = json!({"id": 1, "jsonrpc": "2.0", "method": "ping", "params": [false]});
    let (frame, _) = duplex(&d, raw).await;
    let frame = frame.unwrap();
    assert_eq!(frame.result, Some(json!("pong")));
    assert_eq!(frame.id, Some(Id::Number(1)));
    assert!(frame.error.is_none());
}

#[tokio::test]
async fn test_ping_application_error() {
    let d = dispatcher();
    let raw = json!({"id": 1, "jsonrpc": "2.0", "method": "ping", "params": [true]});
    let (frame, _) = duplex(&d, raw).await;
    let error = frame.unwrap().error.unwrap();
    assert_eq!(error.code, -32000);
    assert_eq!(error.message, "pong_with_error");
}

#[tokio::test]
async fn test_unknown_method_call_answered_with_id() {
    let d = dispatcher();
    let raw = json!({"id": 1, "jsonrpc": "2.0", "method": "nosuch", "params": []});
    let (frame, is_notification) = duplex(&d, raw).await;
    assert!(!is_notification);
    let frame = frame.unwrap();
    assert_eq!(frame.error.as_ref().unwrap().code, -32601);
    assert_eq!(frame.error.as_ref().unwrap().message, "Method Not Found");
    assert_eq!(frame.id, Some(Id::Number(1)));
}

#[tokio::test]
async fn test_unknown_notification_silent() {
    let d = dispatcher();
    let raw = json!({"jsonrpc": "2.0", "method": "nosuch", "params": []});
    let (frame, is_notification) = duplex(&d, raw).await;
    assert!(is_notification);
    assert!(frame.is_none());
}

#[tokio::test]
async fn test_private_name_is_method_not_found_never_invalid_request() {
    let d = Dispatcher::new();
    // Even registered, a leading underscore resolves as not-found.
    d.method("_test", from_fn(|_| async { Ok(json!(1)) }));
    let raw = json!({"id": "2", "jsonrpc": "2.0", "method": "_test", "params": {}});
    let (frame, _) = duplex(&d, raw).await;
    let frame = frame.unwrap();
    assert_eq!(frame.error.unwrap().code, -32601);
    assert_eq!(frame.id, Some(Id::String("2".to_string())));
}

#[tokio::test]
async fn test_transport_flags_gate_resolution() {
    let d = Dispatcher::new();
    d.method_with(
        "duplex_only",
        Capabilities::duplex_only(),
        from_fn(|_| async { Ok(json!(true)) }),
    );
    d.method_with(
        "http_only",
        Capabilities::request_response_only(),
        from_fn(|_| async { Ok(json!(true)) }),
    );

    let call = |method: &str| json!({"id": 1, "jsonrpc": "2.0", "method": method});

    let (frame, _) = d
        .process(call("duplex_only"), Transport::Duplex, ctx(Transport::Duplex))
        .await;
    assert!(frame.unwrap().is_success());

    let (frame, _) = d
        .process(
            call("duplex_only"),
            Transport::RequestResponse,
            ctx(Transport::RequestResponse),
        )
        .await;
    assert_eq!(frame.unwrap().error.unwrap().code, -32601);

    let (frame, _) = d
        .process(call("http_only"), Transport::Duplex, ctx(Transport::Duplex))
        .await;
    assert_eq!(frame.unwrap().error.unwrap().code, -32601);
}

#[tokio::test]
async fn test_id_echoed_byte_for_byte() {
    let d = dispatcher();

    let raw = json!({"id": 42, "jsonrpc": "2.0", "method": "ping", "params": [false]});
    let (frame, _) = duplex(&d, raw).await;
    let text = serde_json::to_string(&frame.unwrap()).unwrap();
    assert!(text.contains("\"id\":42"));

    let raw = json!({"id": "42", "jsonrpc": "2.0", "method": "ping", "params": [false]});
    let (frame, _) = duplex(&d, raw).await;
    let text = serde_json::to_string(&frame.unwrap()).unwrap();
    assert!(text.contains("\"id\":\"42\""));
}

#[tokio::test]
async fn test_malformed_input_is_idempotent() {
    let d = dispatcher();
    let raw = json!({"id": 1, "jsonrpc": "2.0", "value": "x"});

    let (first, _) = duplex(&d, raw.clone()).await;
    let (second, _) = duplex(&d, raw).await;
    assert_eq!(first, second);
    assert_eq!(first.unwrap().error.unwrap().code, -32600);
}

#[tokio::test]
async fn test_notification_return_value_suppressed() {
    let d = Dispatcher::new();
    d.notification("chatty", from_fn(|_| async { Ok(json!({"ignored": true})) }));
    let raw = json!({"jsonrpc": "2.0", "method": "chatty"});
    let (frame, is_notification) = duplex(&d, raw).await;
    assert!(is_notification);
    assert!(frame.is_none());
}

#[tokio::test]
async fn test_notification_fault_suppressed_but_validation_fault_answered() {
    let d = Dispatcher::new();
    d.notification(
        "explodes",
        from_fn(|_| async { Err(HandlerError::new("exception")) }),
    );

    // Handler failure on a notification: silence.
    let raw = json!({"jsonrpc": "2.0", "method": "explodes"});
    let (frame, _) = duplex(&d, raw).await;
    assert!(frame.is_none());

    // Shape failure on a notification-shaped frame: still answered.
    let raw = json!({"method": "explodes"});
    let (frame, is_notification) = duplex(&d, raw).await;
    assert!(!is_notification);
    assert_eq!(frame.unwrap().error.unwrap().code, -32600);
}

#[tokio::test]
async fn test_application_fault_data_shaping() {
    let d = Dispatcher::new();
    d.method(
        "one_arg",
        from_fn(|_| async { Err(HandlerError::new("test_data")) }),
    );
    d.method(
        "two_args",
        from_fn(|_| async {
            Err(HandlerError::with_args(
                "test_data",
                vec![json!("test_data"), json!(true)],
            ))
        }),
    );

    let (frame, _) = duplex(&d, json!({"id": 1, "jsonrpc": "2.0", "method": "one_arg"})).await;
    assert_eq!(frame.unwrap().error.unwrap().data, Some(json!("test_data")));

    let (frame, _) = duplex(&d, json!({"id": 1, "jsonrpc": "2.0", "method": "two_args"})).await;
    assert_eq!(
        frame.unwrap().error.unwrap().data,
        Some(json!(["test_data", true]))
    );
}

#[tokio::test]
async fn test_array_payload_rejected_wholesale() {
    let d = dispatcher();
    let raw = json!([
        {"id": 1, "jsonrpc": "2.0", "method": "ping", "params": [false]},
        {"id": 2, "jsonrpc": "2.0", "method": "ping", "params": [false]}
    ]);
    let (frame, _) = duplex(&d, raw).await;
    let frame = frame.unwrap();
    assert_eq!(frame.error.unwrap().code, -32600);
    assert!(frame.id.is_none());
}

#[tokio::test]
async fn test_falsy_ids_classify_as_notifications() {
    let d = dispatcher();
    for id in [json!(0), json!(""), json!(null), json!(false), json!(0.0)] {
        let raw = json!({"id": id, "jsonrpc": "2.0", "method": "notif1"});
        let (frame, is_notification) = duplex(&d, raw).await;
        assert!(is_notification);
        assert!(frame.is_none());
    }
}

#[tokio::test]
async fn test_unusual_truthy_ids_are_calls() {
    let d = dispatcher();
    for id in [json!(2.5), json!(true), json!(u64::MAX)] {
        let raw = json!({"id": id.clone(), "jsonrpc": "2.0", "method": "ping", "params": [false]});
        let (frame, is_notification) = duplex(&d, raw).await;
        assert!(!is_notification);
        let frame = frame.unwrap();
        assert_eq!(frame.result, Some(json!("pong")));
        assert_eq!(frame.id, Some(Id::Other(id)));
    }
}

#[tokio::test]
async fn test_fractional_id_echoed_byte_for_byte() {
    let d = dispatcher();
    let raw = json!({"id": 2.5, "jsonrpc": "2.0", "method": "ping", "params": [false]});
    let (frame, _) = duplex(&d, raw).await;
    let text = serde_json::to_string(&frame.unwrap()).unwrap();
    assert!(text.contains("\"id\":2.5"));
}

#[tokio::test]
async fn test_scalar_params_rejected() {
    let d = dispatcher();
    let raw = json!({"id": 1, "jsonrpc": "2.0", "method": "echo", "params": "pong"});
    let (frame, _) = duplex(&d, raw).await;
    let frame = frame.unwrap();
    assert_eq!(frame.error.unwrap().code, -32602);
    assert_eq!(frame.id, Some(Id::Number(1)));
}

#[tokio::test]
async fn test_named_params_reach_handler() {
    let d = dispatcher();
    let raw = json!({"id": 1, "jsonrpc": "2.0", "method": "echo", "params": {"value": false}});
    let (frame, _) = duplex(&d, raw).await;
    assert_eq!(frame.unwrap().result, Some(json!({"value": false})));
}

#[tokio::test]
async fn test_session_shared_across_frames() {
    let d = Dispatcher::new();
    d.method(
        "remember",
        from_ctx_fn(|params: Params, ctx: Context| async move {
            ctx.session().set("stash", params.into_value());
            Ok(json!(true))
        }),
    );
    d.method(
        "recall",
        from_ctx_fn(|_, ctx: Context| async move {
            Ok(ctx.session().get("stash").unwrap_or(Value::Null))
        }),
    );

    let session = Session::new();
    let connection_ctx = || Context::new(Transport::Duplex, session.clone());

    let raw = json!({"id": 1, "jsonrpc": "2.0", "method": "remember", "params": [7]});
    d.process(raw, Transport::Duplex, connection_ctx()).await;

    let raw = json!({"id": 2, "jsonrpc": "2.0", "method": "recall"});
    let (frame, _) = d.process(raw, Transport::Duplex, connection_ctx()).await;
    assert_eq!(frame.unwrap().result, Some(json!([7])));
}
