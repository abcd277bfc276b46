//! Connection manager
//!
//! Owns the single live WebSocket handle and the `open`/`closed` state signal.
//! Transports push lifecycle events into a channel; the owner drains them with
//! [`ConnectionManager::process_events`] (once per frame on WASM, on a short
//! tick in the CLI), which is the only place state changes.

use crate::error::ClientError;
use crate::ws_state::WsState;
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, error, info, trace, warn};

/// Payload emitted by [`ConnectionManager::send`]
pub const TEST_MESSAGE: &str = "hello!!!";

/// What a handle reported
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandleEventKind {
    Opened,
    Closed,
    Message(String),
}

/// A lifecycle event tagged with the generation of the handle that produced it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandleEvent {
    pub generation: u64,
    pub kind: HandleEventKind,
}

/// Event reactions handed to a transport when a handle is created.
///
/// Cloneable so platform callbacks can each keep a copy.
#[derive(Clone, Debug)]
pub struct EventSink {
    generation: u64,
    tx: Sender<HandleEvent>,
}

impl EventSink {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn opened(&self) {
        self.push(HandleEventKind::Opened);
    }

    pub fn closed(&self) {
        self.push(HandleEventKind::Closed);
    }

    pub fn message(&self, text: impl Into<String>) {
        self.push(HandleEventKind::Message(text.into()));
    }

    fn push(&self, kind: HandleEventKind) {
        // Receiver gone means the manager was dropped; nothing left to notify.
        let _ = self.tx.send(HandleEvent {
            generation: self.generation,
            kind,
        });
    }
}

/// A live connection created by a [`Transport`]
pub trait Handle {
    /// Write a text frame.
    fn send_text(&mut self, text: &str) -> Result<(), ClientError>;

    /// Request close. Must be idempotent and never fail.
    fn close(&mut self);
}

/// Creates handles to a WebSocket endpoint
pub trait Transport {
    /// Start connecting to `url`. Lifecycle events are reported through
    /// `events`; the transport wires them before returning.
    fn connect(&mut self, url: &str, events: EventSink) -> Result<Box<dyn Handle>, ClientError>;
}

/// Destination for decoded server messages
pub trait MessageSink {
    fn record(&mut self, value: Value);
}

/// Logs server messages at info level (browser console on WASM, stderr on CLI)
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl MessageSink for TracingSink {
    fn record(&mut self, value: Value) {
        info!(target: "server", %value, "Server message");
    }
}

/// Decode an inbound text payload as JSON
pub fn decode_message(text: &str) -> Result<Value, ClientError> {
    Ok(serde_json::from_str(text)?)
}

/// Owns at most one handle at a time plus the state signal read by the view
pub struct ConnectionManager<T: Transport, S: MessageSink = TracingSink> {
    transport: T,
    sink: S,
    url: String,
    handle: Option<Box<dyn Handle>>,
    /// Generation of the current handle (0 = none created yet)
    generation: u64,
    state: WsState,
    /// Generation of the handle whose event last set `state`
    state_generation: u64,
    tx: Sender<HandleEvent>,
    rx: Receiver<HandleEvent>,
    decode_failures: u64,
}

impl<T: Transport, S: MessageSink> ConnectionManager<T, S> {
    /// Create a manager without connecting. State starts `closed`.
    pub fn new(transport: T, sink: S, url: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            transport,
            sink,
            url: url.into(),
            handle: None,
            generation: 0,
            state: WsState::Closed,
            state_generation: 0,
            tx,
            rx,
            decode_failures: 0,
        }
    }

    /// Create a manager and open the first connection.
    ///
    /// A transport failure is logged by `refresh` and leaves the state `closed`.
    pub fn connect(transport: T, sink: S, url: impl Into<String>) -> Self {
        let mut manager = Self::new(transport, sink, url);
        if let Err(e) = manager.refresh() {
            debug!(error = %e, "Initial connection not created");
        }
        manager
    }

    /// Close the current handle (if any) and install a new one.
    pub fn refresh(&mut self) -> Result<(), ClientError> {
        if let Some(mut old) = self.handle.take() {
            debug!(generation = self.generation, "Closing previous connection");
            old.close();
        }

        self.generation += 1;
        let events = EventSink {
            generation: self.generation,
            tx: self.tx.clone(),
        };

        info!(url = %self.url, generation = self.generation, "Connecting to WebSocket");
        match self.transport.connect(&self.url, events.clone()) {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, url = %self.url, "Failed to create WebSocket");
                // Report through the queue so state still only moves on events.
                events.closed();
                Err(e)
            }
        }
    }

    /// Whether the current handle itself reported open
    pub fn is_open(&self) -> bool {
        self.state.is_open() && self.state_generation == self.generation
    }

    /// Send the fixed test message on the current handle.
    pub fn send(&mut self) -> Result<(), ClientError> {
        debug!("Attempting to send");
        let open = self.is_open();
        match self.handle.as_mut() {
            Some(handle) if open => handle.send_text(TEST_MESSAGE),
            _ => {
                warn!(state = %self.state, "Connection not open, message not sent");
                Err(ClientError::NotOpen)
            }
        }
    }

    /// Apply queued handle events in arrival order.
    ///
    /// Open and message events count only from the current handle. A close
    /// also counts from the handle that set the current state, so closing a
    /// replaced socket shows `closed` until the new one opens. Returns the
    /// number of events applied.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            let current = event.generation == self.generation;
            let accepted = match event.kind {
                HandleEventKind::Closed => current || event.generation == self.state_generation,
                _ => current,
            };
            if !accepted {
                debug!(
                    generation = event.generation,
                    current = self.generation,
                    "Discarding event from replaced connection"
                );
                continue;
            }
            applied += 1;
            match event.kind {
                HandleEventKind::Opened => {
                    info!(url = %self.url, "WebSocket open");
                    self.state = WsState::Open;
                    self.state_generation = event.generation;
                }
                HandleEventKind::Closed => {
                    warn!(url = %self.url, generation = event.generation, "WebSocket closed");
                    self.state = WsState::Closed;
                    self.state_generation = event.generation;
                }
                HandleEventKind::Message(text) => {
                    trace!(len = text.len(), "Message received");
                    match decode_message(&text) {
                        Ok(value) => self.sink.record(value),
                        Err(e) => {
                            warn!(error = %e, len = text.len(), "Dropping malformed server message");
                            self.decode_failures += 1;
                        }
                    }
                }
            }
        }
        applied
    }

    /// Close the current handle, if any.
    pub fn shutdown(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            info!(generation = self.generation, "Closing connection");
            handle.close();
        }
    }

    pub fn state(&self) -> WsState {
        self.state
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    /// Number of inbound payloads dropped because they were not JSON
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<T: Transport, S: MessageSink> Drop for ConnectionManager<T, S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}


#[cfg(test)]
mod tests {
    use super::mock::{MockTransport, RecordingSink, Sockets};
    use super::*;
    use serde_json::json;

    const URL: &str = "ws://localhost:8765/";

    fn manager() -> (ConnectionManager<MockTransport, RecordingSink>, Sockets) {
        let transport = MockTransport::default();
        let sockets = transport.sockets.clone();
        (ConnectionManager::new(transport, RecordingSink::default(), URL), sockets)
    }

    fn fire(sockets: &Sockets, index: usize, f: impl FnOnce(&EventSink)) {
        let events = sockets.borrow()[index].events.clone();
        f(&events);
    }

    #[test]
    fn initial_state_is_closed() {
        let (mut m, sockets) = manager();
        assert_eq!(m.state(), WsState::Closed);
        assert!(!m.has_handle());

        m.refresh().unwrap();
        m.process_events();
        assert_eq!(m.state(), WsState::Closed);
        assert_eq!(sockets.borrow().len(), 1);
        assert_eq!(sockets.borrow()[0].url, URL);
    }

    #[test]
    fn open_then_close_updates_state() {
        let (mut m, sockets) = manager();
        m.refresh().unwrap();

        fire(&sockets, 0, |e| e.opened());
        assert_eq!(m.process_events(), 1);
        assert_eq!(m.state(), WsState::Open);

        fire(&sockets, 0, |e| e.closed());
        m.process_events();
        assert_eq!(m.state(), WsState::Closed);
    }

    #[test]
    fn state_changes_only_after_events_are_processed() {
        let (mut m, sockets) = manager();
        m.refresh().unwrap();
        fire(&sockets, 0, |e| e.opened());
        assert_eq!(m.state(), WsState::Closed);
        m.process_events();
        assert_eq!(m.state(), WsState::Open);
    }

    #[test]
    fn double_refresh_closes_first_handle_once() {
        let (mut m, sockets) = manager();
        m.refresh().unwrap();
        m.refresh().unwrap();

        let sockets = sockets.borrow();
        assert_eq!(sockets.len(), 2);
        assert_eq!(sockets[0].close_requests, 1);
        assert_eq!(sockets[1].close_requests, 0);
        assert_eq!(m.generation(), 2);
    }

    #[test]
    fn every_replaced_handle_gets_a_close_request() {
        let (mut m, sockets) = manager();
        for _ in 0..5 {
            m.refresh().unwrap();
            let sockets = sockets.borrow();
            let live = sockets.iter().filter(|s| s.close_requests == 0).count();
            assert_eq!(live, 1);
        }
        let sockets = sockets.borrow();
        assert!(sockets[..4].iter().all(|s| s.close_requests == 1));
    }

    #[test]
    fn events_from_replaced_handle_are_ignored() {
        let (mut m, sockets) = manager();
        m.refresh().unwrap();
        fire(&sockets, 0, |e| e.opened());
        m.process_events();
        assert_eq!(m.state(), WsState::Open);

        m.refresh().unwrap();
        fire(&sockets, 1, |e| e.opened());
        // Old socket's close arrives after the new one opened
        fire(&sockets, 0, |e| e.closed());
        fire(&sockets, 0, |e| e.message(r#"{"stale":true}"#));
        assert_eq!(m.process_events(), 1);
        assert_eq!(m.state(), WsState::Open);
        assert!(m.sink().values.is_empty());
    }

    #[test]
    fn close_of_replaced_handle_shows_closed_until_new_open() {
        let (mut m, sockets) = manager();
        m.refresh().unwrap();
        fire(&sockets, 0, |e| e.opened());
        m.process_events();

        m.refresh().unwrap();
        // New handle still connecting: label lags, but sending is refused
        assert_eq!(m.state(), WsState::Open);
        assert!(!m.is_open());
        assert!(matches!(m.send(), Err(ClientError::NotOpen)));
        assert!(sockets.borrow()[1].writes.is_empty());

        fire(&sockets, 0, |e| e.closed());
        assert_eq!(m.process_events(), 1);
        assert_eq!(m.state(), WsState::Closed);

        fire(&sockets, 1, |e| e.opened());
        m.process_events();
        assert_eq!(m.state(), WsState::Open);
        m.send().unwrap();
        assert_eq!(sockets.borrow()[1].writes, vec![TEST_MESSAGE.to_string()]);
        assert!(sockets.borrow()[0].writes.is_empty());
    }

    #[test]
    fn send_while_open_writes_fixed_payload() {
        let (mut m, sockets) = manager();
        m.refresh().unwrap();
        fire(&sockets, 0, |e| e.opened());
        m.process_events();

        m.send().unwrap();
        assert_eq!(sockets.borrow()[0].writes, vec![TEST_MESSAGE.to_string()]);
    }

    #[test]
    fn send_while_closed_is_rejected() {
        let (mut m, sockets) = manager();
        assert!(matches!(m.send(), Err(ClientError::NotOpen)));

        m.refresh().unwrap();
        assert!(matches!(m.send(), Err(ClientError::NotOpen)));
        assert!(sockets.borrow()[0].writes.is_empty());
    }

    #[test]
    fn message_is_decoded_and_forwarded() {
        let (mut m, sockets) = manager();
        m.refresh().unwrap();
        fire(&sockets, 0, |e| e.message("{\"a\":1}"));
        m.process_events();
        assert_eq!(m.sink().values, vec![json!({"a": 1})]);
    }

    #[test]
    fn malformed_message_is_dropped() {
        let (mut m, sockets) = manager();
        m.refresh().unwrap();
        fire(&sockets, 0, |e| {
            e.opened();
            e.message("not json");
            e.message("\"hello from server! you are client 1\"");
        });
        assert_eq!(m.process_events(), 3);
        assert_eq!(m.decode_failures(), 1);
        assert_eq!(m.state(), WsState::Open);
        assert_eq!(m.sink().values, vec![json!("hello from server! you are client 1")]);
    }

    #[test]
    fn transport_failure_leaves_state_closed() {
        let (mut m, sockets) = manager();
        m.refresh().unwrap();
        fire(&sockets, 0, |e| e.opened());
        m.process_events();

        m.transport.fail_next = true;
        assert!(matches!(m.refresh(), Err(ClientError::Transport(_))));
        assert!(!m.has_handle());
        assert_eq!(sockets.borrow()[0].close_requests, 1);
        m.process_events();
        assert_eq!(m.state(), WsState::Closed);

        // Refresh stays available
        m.refresh().unwrap();
        assert!(m.has_handle());
    }

    #[test]
    fn connect_survives_transport_failure() {
        let transport = MockTransport {
            fail_next: true,
            ..Default::default()
        };
        let mut m = ConnectionManager::connect(transport, RecordingSink::default(), URL);
        assert!(!m.has_handle());
        m.process_events();
        assert_eq!(m.state(), WsState::Closed);
    }

    #[test]
    fn drop_closes_current_handle() {
        let (mut m, sockets) = manager();
        m.refresh().unwrap();
        drop(m);
        assert_eq!(sockets.borrow()[0].close_requests, 1);
    }

    #[test]
    fn decode_message_reports_errors() {
        assert_eq!(decode_message("[1,2]").unwrap(), json!([1, 2]));
        assert!(matches!(decode_message("{"), Err(ClientError::Decode(_))));
    }
}
