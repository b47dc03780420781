//! Error types for the signalling session.

use thiserror::Error;

/// Errors reported by a signalling client.
#[derive(Debug, Error)]
pub enum SignallingError {
    /// Registration or session setup failed; the driver retries after a delay
    #[error("Session initialization failed: {message}")]
    InitFailed { message: String },

    /// The session's event source has gone away
    #[error("Session ended")]
    SessionEnded,
}

impl SignallingError {
    /// Create a new initialization error.
    pub fn init_failed(message: impl Into<String>) -> Self {
        Self::InitFailed {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SignallingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            SignallingError::init_failed("401 Unauthorized").to_string(),
            "Session initialization failed: 401 Unauthorized"
        );
        assert_eq!(SignallingError::SessionEnded.to_string(), "Session ended");
    }
}
