use async_trait::async_trait;

use crate::error::VoiceError;

/// Synthesis parameters passed with every utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechParams {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            rate: 0.9,
            pitch: 1.0,
            volume: 0.8,
        }
    }
}

/// Platform speech capability.
///
/// Capture results and errors are not returned from `start_capture`; the
/// platform adapter delivers them later through
/// [`VoiceController::on_result`](crate::VoiceController::on_result) and
/// [`VoiceController::on_error`](crate::VoiceController::on_error).
#[async_trait]
pub trait VoicePlatform: Send + Sync {
    fn capture_available(&self) -> bool;

    fn synthesis_available(&self) -> bool;

    async fn start_capture(&self, language: &str) -> Result<(), VoiceError>;

    async fn stop_capture(&self) -> Result<(), VoiceError>;

    /// Speak `text`. Any utterance already playing may be cancelled first.
    async fn speak(&self, text: &str, language: &str, params: SpeechParams)
        -> Result<(), VoiceError>;
}

/// A platform with neither capture nor synthesis.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlatform;

#[async_trait]
impl VoicePlatform for NullPlatform {
    fn capture_available(&self) -> bool {
        false
    }

    fn synthesis_available(&self) -> bool {
        false
    }

    async fn start_capture(&self, _language: &str) -> Result<(), VoiceError> {
        Err(VoiceError::CaptureUnavailable)
    }

    async fn stop_capture(&self) -> Result<(), VoiceError> {
        Ok(())
    }

    async fn speak(&self, _text: &str, _language: &str, _params: SpeechParams) -> Result<(), VoiceError> {
        Err(VoiceError::SynthesisUnavailable)
    }
}

/// Capture performed by an external client (for example a browser talking
/// to the local API). Starting and stopping only toggle local state; results
/// arrive later through the controller callbacks. Synthesis is not available.
#[derive(Debug, Default, Clone, Copy)]
pub struct DelegatedPlatform;

#[async_trait]
impl VoicePlatform for DelegatedPlatform {
    fn capture_available(&self) -> bool {
        true
    }

    fn synthesis_available(&self) -> bool {
        false
    }

    async fn start_capture(&self, language: &str) -> Result<(), VoiceError> {
        tracing::debug!(language, "Waiting for delegated capture result");
        Ok(())
    }

    async fn stop_capture(&self) -> Result<(), VoiceError> {
        Ok(())
    }

    async fn speak(&self, _text: &str, _language: &str, _params: SpeechParams) -> Result<(), VoiceError> {
        Err(VoiceError::SynthesisUnavailable)
    }
}
