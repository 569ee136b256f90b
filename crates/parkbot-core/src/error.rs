use thiserror::Error;

/// Top-level error type for the Parkbot system.
///
/// Covers infrastructure failures only. The dialogue engine never produces
/// an error for utterance content; anything that reaches this type came from
/// configuration, storage, or serialization.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParkbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ParkbotError {
    fn from(err: toml::de::Error) -> Self {
        ParkbotError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ParkbotError {
    fn from(err: toml::ser::Error) -> Self {
        ParkbotError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ParkbotError {
    fn from(err: serde_json::Error) -> Self {
        ParkbotError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Parkbot operations.
pub type Result<T> = std::result::Result<T, ParkbotError>;
