//! Error types for message dispatch.

use std::time::Duration;

/// Errors from the chat pipeline.
///
/// Only the validation errors reach callers of `send`; remote failures are
/// absorbed by the fallback responder.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("chat service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("chat service returned status {0}")]
    Status(u16),
    #[error("malformed reply: {0}")]
    MalformedReply(String),
    #[error("chat service not configured")]
    NotConfigured,
    #[error("invalid fallback rule: {0}")]
    InvalidRule(#[from] regex::Error),
}

impl ChatError {
    /// Whether the error is recovered by the fallback responder.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ChatError::EmptyMessage | ChatError::MessageTooLong(_) | ChatError::InvalidRule(_)
        )
    }
}
