//! Browser view
//!
//! egui app drawing the heading, the state label and the two controls. The
//! connection manager is drained once per frame, so a state change shows up
//! on the frame after the socket reports it.

use eframe::egui;
use tracing::debug;

use crate::connection::{ConnectionManager, TracingSink};
use crate::theme::{colors, minimal_visuals};
use crate::view::{Control, ViewModel};
use crate::websocket_wasm::WasmTransport;
use crate::ws_state::WsState;
use crate::DEFAULT_WS_URL;

pub struct WebUiApp {
    manager: ConnectionManager<WasmTransport, TracingSink>,
}

impl WebUiApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(minimal_visuals());
        Self {
            manager: ConnectionManager::connect(WasmTransport, TracingSink, DEFAULT_WS_URL),
        }
    }

    fn press(&mut self, control: Control) {
        let result = match control {
            Control::Send => self.manager.send(),
            Control::Refresh => self.manager.refresh(),
        };
        if let Err(e) = result {
            debug!(error = %e, control = control.command(), "Control failed");
        }
    }
}

impl eframe::App for WebUiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Socket callbacks don't wake egui, keep polling
        ctx.request_repaint();

        self.manager.process_events();
        let model = ViewModel::from_state(self.manager.state());

        let mut pressed = None;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY).inner_margin(16.0))
            .show(ctx, |ui| {
                ui.heading(egui::RichText::new(model.heading).color(colors::TEXT_PRIMARY));
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    for control in model.controls {
                        if ui.button(control.label()).clicked() {
                            pressed = Some(control);
                        }
                    }
                });
                ui.label(egui::RichText::new(model.hint).color(colors::TEXT_SECONDARY));

                let state_color = match model.state {
                    WsState::Open => colors::STATE_OPEN,
                    WsState::Closed => colors::STATE_CLOSED,
                };
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Current state:").color(colors::TEXT_MUTED));
                    ui.colored_label(state_color, model.state.as_str());
                });
            });

        if let Some(control) = pressed {
            self.press(control);
        }
    }
}
