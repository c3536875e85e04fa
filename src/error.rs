use thiserror::Error;

/// Protocol-layer errors: serialization, transport and envelope failures.
///
/// Tool-level failures never surface here; they travel inside a successful
/// response flagged by `CallToolResult::is_error`.
#[derive(Error, Debug, Clone)]
pub enum MCPError {
    #[error("JSON serialization error: {0}")]
    Serialization(String),

    #[error("JSON deserialization error: {0}")]
    Deserialization(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Timeout error: {0}")]
    Timeout(String),
}

impl From<serde_json::Error> for MCPError {
    fn from(err: serde_json::Error) -> Self {
        MCPError::Serialization(err.to_string())
    }
}
