//! Native WebSocket transport
//!
//! Each handle is a tokio task driving a tokio-tungstenite stream. The handle
//! talks to the task over an unbounded channel; the task reports lifecycle
//! events through the manager's [`EventSink`].
//!
//! Tests run with: cargo test --features cli

use crate::connection::{EventSink, Handle, Transport};
use crate::error::ClientError;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

enum Outbound {
    Text(String),
    Close,
}

/// Spawns connection tasks on a tokio runtime
#[derive(Clone, Debug)]
pub struct NativeTransport {
    runtime: tokio::runtime::Handle,
}

impl NativeTransport {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }

    /// Use the runtime of the calling context.
    ///
    /// Panics outside a tokio runtime, like `tokio::spawn`.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl Transport for NativeTransport {
    fn connect(&mut self, url: &str, events: EventSink) -> Result<Box<dyn Handle>, ClientError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.runtime.spawn(run_websocket(url.to_string(), rx, events));
        Ok(Box::new(NativeHandle {
            tx,
            close_requested: false,
        }))
    }
}

/// Handle to one connection task
pub struct NativeHandle {
    tx: UnboundedSender<Outbound>,
    close_requested: bool,
}

impl Handle for NativeHandle {
    fn send_text(&mut self, text: &str) -> Result<(), ClientError> {
        self.tx
            .send(Outbound::Text(text.to_string()))
            .map_err(|_| ClientError::Transport("connection task has stopped".into()))
    }

    fn close(&mut self) {
        if self.close_requested {
            return;
        }
        self.close_requested = true;
        // Task already gone means the socket is closed.
        let _ = self.tx.send(Outbound::Close);
    }
}

async fn run_websocket(url: String, mut outbound: UnboundedReceiver<Outbound>, events: EventSink) {
    let generation = events.generation();

    let ws_stream = match connect_async(url.as_str()).await {
        Ok((stream, _)) => {
            info!(url = %url, generation, "WebSocket connected");
            stream
        }
        Err(e) => {
            error!(error = %e, url = %url, generation, "Failed to connect");
            events.closed();
            return;
        }
    };
    events.opened();

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            cmd = outbound.recv() => match cmd {
                Some(Outbound::Text(text)) => {
                    debug!(generation, len = text.len(), "Sending message");
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        error!(error = %e, generation, "Failed to send message");
                        break;
                    }
                }
                // Close requested, or the handle was dropped
                Some(Outbound::Close) | None => {
                    debug!(generation, "Closing WebSocket");
                    if let Err(e) = write.close().await {
                        debug!(error = %e, generation, "Close handshake failed");
                    }
                    break;
                }
            },
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => events.message(text.to_string()),
                Some(Ok(Message::Close(frame))) => {
                    warn!(generation, ?frame, "WebSocket closed by server");
                    break;
                }
                Some(Err(e)) => {
                    error!(error = %e, generation, "WebSocket error");
                    break;
                }
                None => break,
                _ => {}
            },
        }
    }

    debug!(generation, "WebSocket stream ended");
    events.closed();
}
