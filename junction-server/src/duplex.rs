//! WebSocket connection handling
//!
//! This module runs the lifecycle of one duplex connection, from TCP accept
//! through WebSocket upgrade to frame processing and teardown.
//!
//! # Task Model
//!
//! Each connection runs two tasks:
//! - **Receive task**: reads WebSocket messages, feeds text frames to the
//!   dispatcher and queues the replies
//! - **Send task**: drains the outbound channel onto the socket
//!
//! Splitting sending from receiving keeps a slow client write from stalling
//! frame processing, and gives handlers an order-preserving channel for
//! server-initiated pushes: a notification queued during a call lands on the
//! wire before the call's own reply.
//!
//! # Error Handling
//!
//! Per-frame failures are answered on the wire where the protocol allows it
//! (parse failures, encode failures) and never tear the connection down.
//! Transport failures close the connection; both tasks stop and the socket
//! is dropped.

use crate::context::{Context, Session};
use crate::dispatch::Dispatcher;
use crate::registry::Transport;
use futures::{SinkExt, StreamExt};
use junction_core::{codec, Error, ErrorCode, Fault, Frame, Result};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Callback invoked with a [`Peer`] handle when a connection is accepted.
pub type PeerHook = Arc<dyn Fn(Peer) + Send + Sync>;

/// Handle for pushing frames to one connected client.
///
/// Handed to the server's `on_connect` hook once the connection is upgraded,
/// so the embedding application can push notifications independent of any
/// inbound call. Lightweight (an id and a channel sender); cloning creates
/// another sender onto the same connection.
#[derive(Clone)]
pub struct Peer {
    /// Unique connection ID assigned by the server
    pub id: u64,
    tx: mpsc::UnboundedSender<String>,
}

impl Peer {
    /// Create a new peer handle.
    pub fn new(id: u64, tx: mpsc::UnboundedSender<String>) -> Self {
        Self { id, tx }
    }

    /// Push a server-initiated notification to the client.
    pub fn notify(&self, method: impl Into<String>, params: Option<serde_json::Value>) -> Result<()> {
        let frame = Frame::request(method, params);
        let text = codec::encode(&frame)?;
        self.tx.send(text).map_err(|_| Error::ConnectionClosed)?;
        Ok(())
    }
}

/// Serve a single WebSocket connection until either side closes it.
#[tracing::instrument(skip(stream, dispatcher, session, on_connect), fields(conn_id = conn_id))]
pub async fn serve_connection(
    stream: TcpStream,
    conn_id: u64,
    dispatcher: Dispatcher,
    session: Session,
    on_connect: Option<PeerHook>,
) -> Result<()> {
    tracing::debug!("Upgrading connection to WebSocket");
    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| Error::WebSocket(e.to_string()))?;

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Outbound channel: dispatcher replies, handler pushes and peer pushes
    // all go through here, so ordering between them is preserved.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    if let Some(hook) = on_connect {
        hook(Peer::new(conn_id, tx.clone()));
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if let Err(e) = ws_sender.send(Message::Text(text)).await {
                tracing::error!(error = %e, "Error sending message");
                break;
            }
        }
    });

    let tx_clone = tx.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(message) = ws_receiver.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let ctx = Context::with_outbound(
                        Transport::Duplex,
                        session.clone(),
                        tx_clone.clone(),
                    );
                    if let Err(e) = handle_text(&text, &dispatcher, &tx_clone, ctx).await {
                        tracing::error!(error = %e, "Error handling message");
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Connection closed by client");
                    break;
                }
                Ok(_) => {} // Ignore ping/pong/binary
                Err(e) => {
                    tracing::error!(error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    tracing::info!("Connection closed");
    Ok(())
}

/// Handle one inbound text frame.
///
/// Runs the dispatch pipeline and queues at most one reply. Parse failures
/// are answered with a Parse Error frame; a reply that cannot be serialized
/// is replaced by an Error-while-parsing-result frame carrying the offending
/// reply's debug rendering as data.
async fn handle_text(
    text: &str,
    dispatcher: &Dispatcher,
    tx: &mpsc::UnboundedSender<String>,
    ctx: Context,
) -> Result<()> {
    let raw = match codec::decode(text) {
        Ok(raw) => raw,
        Err(Error::Fault(fault)) => {
            let reply = codec::encode(&fault.into_frame())?;
            tx.send(reply).map_err(|_| Error::ConnectionClosed)?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let (frame, is_notification) = dispatcher
        .process(raw, Transport::Duplex, ctx)
        .await;
    if is_notification {
        return Ok(());
    }
    let frame = match frame {
        Some(frame) => frame,
        None => return Ok(()),
    };

    let reply = match codec::encode(&frame) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize reply");
            let fault = Fault::with_data(
                frame.id.clone(),
                ErrorCode::ParseResultError,
                Some(serde_json::Value::String(format!("{:?}", frame.result))),
            );
            codec::encode(&fault.into_frame())?
        }
    };
    tx.send(reply).map_err(|_| Error::ConnectionClosed)?;
    Ok(())
}
