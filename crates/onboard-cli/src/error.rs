//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// A flow ran but at least one step failed
    #[error("{flow} failed at step \"{step}\": {message}")]
    FlowFailed {
        /// Flow name
        flow: String,
        /// First failing step
        step: String,
        /// Error of that step
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Onboard library error
    #[error("Onboard error: {0}")]
    Onboard(#[from] onboard::OnboardError),

    /// Logging could not be installed
    #[error("Logging setup failed: {message}")]
    Logging {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a flow failure error
    #[must_use]
    pub fn flow_failed(
        flow: impl Into<String>,
        step: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::FlowFailed {
            flow: flow.into(),
            step: step.into(),
            message: message.into(),
        }
    }
}
