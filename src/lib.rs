//! WEBUI - WebSocket front-end for the gytmdl download server
//!
//! Opens a WebSocket to the local server, shows whether it is open, and offers
//! two controls: send a fixed test message and refresh the connection. Server
//! messages are decoded as JSON and logged.
//!
//! - `wasm` feature: egui app running in the browser
//! - `cli` feature: `webui-cli` terminal client on tokio-tungstenite

pub mod connection;
pub mod error;
pub mod server_config;
pub mod view;
pub mod ws_state;

#[cfg(all(feature = "cli", not(target_arch = "wasm32")))]
pub mod websocket_native;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod app;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod theme;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod websocket_wasm;

pub use connection::{ConnectionManager, MessageSink, TracingSink, TEST_MESSAGE};
pub use error::ClientError;
pub use server_config::ServerConfig;
pub use ws_state::WsState;

/// Default WebSocket URL of the download server
pub const DEFAULT_WS_URL: &str = "ws://localhost:8765/";

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    use wasm_bindgen::JsCast;

    console_error_panic_hook::set_once();

    // Initialize tracing for browser console
    tracing_wasm::set_as_global_default();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let canvas = web_sys::window()
            .expect("no window")
            .document()
            .expect("no document")
            .get_element_by_id("canvas")
            .expect("no canvas element")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("not a canvas element");

        eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(app::WebUiApp::new(cc)))),
            )
            .await
            .expect("Failed to start eframe");
    });
}
