//! Error types for the chat engine.

use parkbot_core::error::ParkbotError;

/// Errors from the chat engine.
///
/// Utterance content never produces an error. These cover request
/// validation at the entry point and collaborator failures.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ChatError {
    #[error("user id cannot be empty")]
    EmptyUserId,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<ParkbotError> for ChatError {
    fn from(err: ParkbotError) -> Self {
        ChatError::Storage(err.to_string())
    }
}
