//! Shared WebSocket connection state
//!
//! Used by the connection manager and both views.

use std::fmt;

/// WebSocket connection state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WsState {
    Open,
    #[default]
    Closed,
}

impl WsState {
    pub fn is_open(&self) -> bool {
        matches!(self, WsState::Open)
    }

    /// Label shown by the views
    pub fn as_str(&self) -> &'static str {
        match self {
            WsState::Open => "open",
            WsState::Closed => "closed",
        }
    }
}

impl fmt::Display for WsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
