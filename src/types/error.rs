use thiserror::Error;

/// Errors produced at the link boundary and by the manager's public calls.
///
/// Inside the manager's loop they never propagate: open errors become a
/// scheduled retry and heartbeat send errors are swallowed.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The channel could not be opened
    #[error("Open failed: {0}")]
    Open(String),

    /// A message could not be enqueued on an open link
    #[error("Send failed: {0}")]
    Send(String),

    /// The manager stopped before the awaited state was reached
    #[error("Manager stopped")]
    Closed,

    /// WebSocket protocol error (handshake failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error (malformed endpoint URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid manager configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for `Result<T, LinkError>`.
pub type Result<T> = std::result::Result<T, LinkError>;
