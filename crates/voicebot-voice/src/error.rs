use thiserror::Error;
use voicebot_core::CaptureState;

/// Errors from the voice capture and synthesis layer.
///
/// None of these end the session: the controller converts them into
/// notifications and returns capture to Idle.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Voice capture is not available on this platform")]
    CaptureUnavailable,

    #[error("Speech synthesis is not available on this platform")]
    SynthesisUnavailable,

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Invalid capture transition: {from} -> {to}")]
    InvalidTransition { from: CaptureState, to: CaptureState },
}
