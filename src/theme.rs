//! Dark theme for the browser view: one panel, two buttons, a state label

use egui::{Color32, Stroke};

pub mod colors {
    use super::Color32;

    pub const BG_PRIMARY: Color32 = Color32::from_rgb(0, 0, 0);
    pub const BUTTON: Color32 = Color32::from_rgb(20, 20, 20);
    pub const BUTTON_HOVER: Color32 = Color32::from_rgb(40, 40, 40);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(255, 255, 255);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(160, 160, 160);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(110, 110, 110);

    // State label
    pub const STATE_OPEN: Color32 = Color32::from_rgb(100, 200, 100);
    pub const STATE_CLOSED: Color32 = Color32::from_rgb(200, 100, 100);
}

/// Dark visuals with flat buttons
pub fn minimal_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = BG_PRIMARY;
    visuals.override_text_color = Some(TEXT_PRIMARY);

    let buttons = [
        (&mut visuals.widgets.inactive, BUTTON, TEXT_SECONDARY),
        (&mut visuals.widgets.hovered, BUTTON_HOVER, TEXT_PRIMARY),
        (&mut visuals.widgets.active, BUTTON_HOVER, TEXT_PRIMARY),
    ];
    for (widget, fill, stroke) in buttons {
        widget.weak_bg_fill = fill;
        widget.bg_stroke = Stroke::new(1.0, stroke);
    }

    visuals
}
