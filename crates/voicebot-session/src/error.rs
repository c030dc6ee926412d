use thiserror::Error;
use voicebot_chat::ChatError;
use voicebot_command::CommandError;
use voicebot_core::VoicebotError;
use voicebot_insight::InsightError;
use voicebot_voice::VoiceError;

/// Errors surfaced by [`crate::SessionController`] operations.
///
/// Most failures inside the session are recovered locally and reported as
/// notifications; these are the ones a caller can act on.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] VoicebotError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error(transparent)]
    Insight(#[from] InsightError),

    #[error("no quick reply at index {0}")]
    NoQuickReply(usize),

    #[error("background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for SessionError {
    fn from(err: tokio::task::JoinError) -> Self {
        SessionError::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_transparent() {
        let err: SessionError = ChatError::EmptyMessage.into();
        assert_eq!(err.to_string(), ChatError::EmptyMessage.to_string());

        let err: SessionError = VoicebotError::UnsupportedLanguage("fr-FR".into()).into();
        assert!(err.to_string().contains("fr-FR"));
    }

    #[test]
    fn test_no_quick_reply() {
        assert_eq!(
            SessionError::NoQuickReply(3).to_string(),
            "no quick reply at index 3"
        );
    }
}
