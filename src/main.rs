//! Terminal client for the gytmdl download server
//!
//! Run with: cargo run --features cli --bin webui-cli
//! Type `send`, `refresh` or `quit`.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use gytmdl_webui::connection::{ConnectionManager, TracingSink};
    use gytmdl_webui::view::{Command, Control, ViewModel};
    use gytmdl_webui::websocket_native::NativeTransport;
    use gytmdl_webui::DEFAULT_WS_URL;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tracing::{debug, info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gytmdl_webui=debug"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let url = std::env::var("WEBUI_WS").unwrap_or_else(|_| DEFAULT_WS_URL.to_string());
    info!(url = %url, env_set = std::env::var("WEBUI_WS").is_ok(), "WebSocket URL resolved");

    let mut manager = ConnectionManager::connect(NativeTransport::current(), TracingSink, url);
    let mut last_state = manager.state();
    print!("{}", ViewModel::from_state(last_state).render_text());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(Duration::from_millis(50));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Some(Command::Press(Control::Send)) => {
                        if let Err(e) = manager.send() {
                            println!("not sent: {e}");
                        }
                    }
                    Some(Command::Press(Control::Refresh)) => {
                        if let Err(e) = manager.refresh() {
                            debug!(error = %e, "Refresh failed");
                        }
                    }
                    Some(Command::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => warn!(input = %line.trim(), "Unknown command"),
                }
            }
            _ = tick.tick() => {}
        }

        manager.process_events();
        if manager.state() != last_state {
            last_state = manager.state();
            println!("{}", ViewModel::from_state(last_state).state_line());
        }
    }

    manager.shutdown();
    // Let the connection task send its close frame
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
