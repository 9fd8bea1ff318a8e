//! Error types for yantra-node

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// yantra-node error types
///
/// The control layer itself is total (unknown commands echo, they never
/// fail); these variants cover only I/O and configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse error
    #[error("Config error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration write error
    #[error("Config error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
