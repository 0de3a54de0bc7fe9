//! Result and error types for Onboard.

use thiserror::Error;

/// Result type for Onboard operations
pub type OnboardResult<T> = Result<T, OnboardError>;

/// Errors that can occur while driving the UI
#[derive(Debug, Error)]
pub enum OnboardError {
    /// Element never became visible within the timeout
    #[error("Element \"{selector}\" not visible after {elapsed_ms}ms")]
    ElementNotVisible {
        /// Selector that was queried
        selector: String,
        /// Time spent waiting
        elapsed_ms: u64,
    },

    /// Element never appeared in the UI tree within the timeout
    #[error("Element \"{selector}\" not in UI tree after {elapsed_ms}ms")]
    ElementNotFound {
        /// Selector that was queried
        selector: String,
        /// Time spent waiting
        elapsed_ms: u64,
    },

    /// Landing marker never appeared before the availability deadline
    #[error("Server at {url} did not become available after {waited_ms}ms")]
    ServerUnavailable {
        /// URL that was polled
        url: String,
        /// Total time spent polling
        waited_ms: u64,
    },

    /// Selector does not follow the expected convention
    #[error("Invalid selector \"{selector}\": {message}")]
    InvalidSelector {
        /// Offending selector
        selector: String,
        /// Error message
        message: String,
    },

    /// Generated or supplied test data is malformed
    #[error("Invalid test data: {message}")]
    InvalidData {
        /// Error message
        message: String,
    },

    /// Driver rejected a command
    #[error("Driver command {command} failed: {message}")]
    Driver {
        /// Command that failed
        command: String,
        /// Error message
        message: String,
    },

    /// Session could not be created
    #[error("Failed to start session: {message}")]
    SessionNotStarted {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// A flow check did not hold (page not loaded, dialog missing)
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Configuration value could not be resolved
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error
    #[cfg(feature = "wire")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl OnboardError {
    /// Create a driver error
    #[must_use]
    pub fn driver(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Driver {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create an invalid data error
    #[must_use]
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error is a wait timeout on an element
    #[must_use]
    pub const fn is_wait_timeout(&self) -> bool {
        matches!(
            self,
            Self::ElementNotVisible { .. } | Self::ElementNotFound { .. }
        )
    }
}
