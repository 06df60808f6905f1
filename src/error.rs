// Centralized error handling using thiserror for type-safe error management
//
// Design Decision: one error enum for the whole crate. Each variant maps to a
// failure mode the controller may have to render as a transcript entry.

use thiserror::Error;

/// Main error type for Cinebot
///
/// Error Handling Strategy:
/// - IO errors: Automatically converted via #[from] IoError variant
/// - Serde errors: Automatically converted via #[from] SerdeError variant
/// - HTTP errors: Automatically converted via #[from] ReqwestError variant
/// - Application errors: Use specific variants (ConfigError, ToolError, etc.)
#[derive(Debug, Error)]
pub enum CinebotError {
    /// Agent invocation failed
    ///
    /// Displays the message verbatim because the controller shows it to the
    /// user as `Error: {message}`.
    #[error("{0}")]
    AgentError(String),

    /// Generic API-level error with context
    #[error("API error: {0}")]
    ApiError(String),

    /// A tool (web search, trailer lookup) failed to produce output
    #[error("Tool error: {0}")]
    ToolError(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Environment variable not found or invalid
    ///
    /// Missing required environment variables (API keys, etc.)
    #[error("Environment error: {0}")]
    EnvError(String),

    /// IO operation failed (file, network, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// HTTP request failed
    ///
    /// Network errors, HTTP errors, timeouts and request building failures.
    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

/// Type alias for Result with CinebotError
pub type Result<T> = std::result::Result<T, CinebotError>;

// The LLM adapter layer reports failures through anyhow; keep the whole cause chain
impl From<anyhow::Error> for CinebotError {
    fn from(err: anyhow::Error) -> Self {
        CinebotError::ApiError(format!("{:#}", err))
    }
}
