//! Error types for the message bus relay.

use thiserror::Error;

/// Errors reported by a bus client.
#[derive(Debug, Error)]
pub enum BusError {
    /// Publishing a message failed
    #[error("Publish to '{topic}' failed: {message}")]
    PublishFailed { topic: String, message: String },
}

impl BusError {
    /// Create a new publish error.
    pub fn publish_failed(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PublishFailed {
            topic: topic.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BusError>;
