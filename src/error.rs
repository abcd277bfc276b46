//! Client error type

/// Errors surfaced by the connection manager and its transports.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// `send()` was called without an open connection.
    #[error("connection is not open")]
    NotOpen,

    /// An inbound payload was not valid JSON.
    #[error("malformed server message: {0}")]
    Decode(#[from] serde_json::Error),

    /// The transport could not create a socket or write to it.
    #[error("transport error: {0}")]
    Transport(String),
}
