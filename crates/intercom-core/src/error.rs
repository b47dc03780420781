use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Access code errors
    #[error("Invalid access code: {message}")]
    InvalidAccessCode { message: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid access code error.
    pub fn invalid_access_code(message: impl Into<String>) -> Self {
        Self::InvalidAccessCode {
            message: message.into(),
        }
    }

    /// Create an invalid configuration value error.
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
