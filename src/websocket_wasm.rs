//! WASM WebSocket transport backed by the browser `WebSocket`

use crate::connection::{EventSink, Handle, Transport};
use crate::error::ClientError;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

/// Creates browser sockets
#[derive(Clone, Copy, Debug, Default)]
pub struct WasmTransport;

/// A browser socket plus the callbacks attached to it
pub struct WasmHandle {
    ws: WebSocket,
    closed: bool,
    _on_open: Closure<dyn FnMut(JsValue)>,
    _on_msg: Closure<dyn FnMut(MessageEvent)>,
    _on_err: Closure<dyn FnMut(Event)>,
    on_close: Option<Closure<dyn FnMut(CloseEvent)>>,
}

impl Transport for WasmTransport {
    fn connect(&mut self, url: &str, events: EventSink) -> Result<Box<dyn Handle>, ClientError> {
        let ws = WebSocket::new(url).map_err(|e| ClientError::Transport(format!("{e:?}")))?;

        // On open - update state
        let sink = events.clone();
        let on_open = Closure::wrap(Box::new(move |_| {
            info!(generation = sink.generation(), "WebSocket connected");
            sink.opened();
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        // On message - queue text payloads for the manager
        let sink = events.clone();
        let on_msg = Closure::wrap(Box::new(move |e: MessageEvent| {
            match e.data().dyn_into::<js_sys::JsString>() {
                Ok(txt) => sink.message(String::from(txt)),
                Err(_) => debug!("Ignoring non-text message"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_msg.as_ref().unchecked_ref()));

        // On error - the browser follows up with a close event
        let on_err = Closure::wrap(Box::new(move |e: Event| {
            error!(event = %e.type_(), "WebSocket error");
        }) as Box<dyn FnMut(Event)>);
        ws.set_onerror(Some(on_err.as_ref().unchecked_ref()));

        // On close
        let sink = events;
        let on_close = Closure::wrap(Box::new(move |e: CloseEvent| {
            let code = e.code();
            let reason = e.reason();
            warn!(code, reason = %reason, generation = sink.generation(), "WebSocket closed");
            sink.closed();
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        Ok(Box::new(WasmHandle {
            ws,
            closed: false,
            _on_open: on_open,
            _on_msg: on_msg,
            _on_err: on_err,
            on_close: Some(on_close),
        }))
    }
}

impl Handle for WasmHandle {
    fn send_text(&mut self, text: &str) -> Result<(), ClientError> {
        self.ws
            .send_with_str(text)
            .map_err(|e| ClientError::Transport(format!("{e:?}")))
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // Only the close event still matters once the socket is retired.
        // Its closure must outlive this handle, the event fires after drop.
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        if let Some(on_close) = self.on_close.take() {
            on_close.forget();
        }
        if let Err(e) = self.ws.close() {
            debug!(error = ?e, "WebSocket close failed");
        }
    }
}

impl Drop for WasmHandle {
    fn drop(&mut self) {
        self.close();
    }
}
