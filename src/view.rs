//! Presentation model shared by the egui and terminal views

use crate::ws_state::WsState;
use std::fmt::Write;

pub const HEADING: &str = "WEBUI";
pub const SEND_LABEL: &str = "Send message";
pub const REFRESH_LABEL: &str = "Refresh connection";
pub const CONSOLE_HINT: &str = "Open console to see messages from server";

/// Everything a view draws, derived from the state signal alone
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewModel {
    pub heading: &'static str,
    pub controls: [Control; 2],
    pub hint: &'static str,
    pub state: WsState,
}

impl ViewModel {
    pub fn from_state(state: WsState) -> Self {
        Self {
            heading: HEADING,
            controls: [Control::Send, Control::Refresh],
            hint: CONSOLE_HINT,
            state,
        }
    }

    pub fn state_line(&self) -> String {
        format!("Current state: {}", self.state)
    }

    /// Plain-text rendering for the terminal
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.heading);
        let controls: Vec<String> = self
            .controls
            .iter()
            .map(|c| format!("[{}] {}", c.command(), c.label()))
            .collect();
        let _ = writeln!(out, "  - {}", controls.join("  "));
        let _ = writeln!(out, "  - {}", self.hint);
        let _ = writeln!(out, "  - {}", self.state_line());
        out
    }
}

/// The two buttons of the view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Send,
    Refresh,
}

impl Control {
    pub fn label(&self) -> &'static str {
        match self {
            Control::Send => SEND_LABEL,
            Control::Refresh => REFRESH_LABEL,
        }
    }

    /// Terminal command bound to this control
    pub fn command(&self) -> &'static str {
        match self {
            Control::Send => "send",
            Control::Refresh => "refresh",
        }
    }
}

/// A line typed into the terminal view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Press(Control),
    Quit,
}

impl Command {
    /// Parse one input line. Blank or unknown input yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "send" | "s" => Some(Command::Press(Control::Send)),
            "refresh" | "r" => Some(Command::Press(Control::Refresh)),
            "quit" | "q" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_reflects_state() {
        let vm = ViewModel::from_state(WsState::Open);
        assert_eq!(vm.heading, "WEBUI");
        assert_eq!(vm.state_line(), "Current state: open");
        assert_eq!(
            ViewModel::from_state(WsState::Closed).state_line(),
            "Current state: closed"
        );
    }

    #[test]
    fn text_rendering_lists_controls_and_state() {
        let text = ViewModel::from_state(WsState::Closed).render_text();
        assert!(text.starts_with("WEBUI\n"));
        assert!(text.contains("[send] Send message"));
        assert!(text.contains("[refresh] Refresh connection"));
        assert!(text.contains("Open console to see messages from server"));
        assert!(text.ends_with("Current state: closed\n"));
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("send"), Some(Command::Press(Control::Send)));
        assert_eq!(Command::parse("  R \n"), Some(Command::Press(Control::Refresh)));
        assert_eq!(Command::parse("quit"), Some(Command::Quit));
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("hello"), None);
    }
}
