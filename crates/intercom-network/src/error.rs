use thiserror::Error;

/// Errors reported by the link-layer collaborator.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The link layer refused or failed a (re)connect request
    #[error("Reconnect request failed: {0}")]
    ReconnectFailed(String),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
