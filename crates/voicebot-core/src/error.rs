use thiserror::Error;

/// Top-level error type shared by the voicebot crates.
///
/// Component crates define their own error enums; this one covers the
/// cross-cutting concerns (configuration, files, serialization) and the
/// session-level rejections surfaced by the controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VoicebotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl From<toml::de::Error> for VoicebotError {
    fn from(err: toml::de::Error) -> Self {
        VoicebotError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VoicebotError {
    fn from(err: toml::ser::Error) -> Self {
        VoicebotError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for VoicebotError {
    fn from(err: serde_json::Error) -> Self {
        VoicebotError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for voicebot operations.
pub type Result<T> = std::result::Result<T, VoicebotError>;
