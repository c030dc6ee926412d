//! Voice I/O controller.
//!
//! Drives the capture state machine from user requests (`start_capture`,
//! `stop_capture`) and platform callbacks (`on_result`, `on_error`), and
//! speaks replies without blocking the caller.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};
use voicebot_core::{CaptureState, EventBus, SessionEvent, Severity, SpeechOutput};
use voicebot_notify::NotificationFeed;

use crate::error::VoiceError;
use crate::platform::{SpeechParams, VoicePlatform};
use crate::state::CaptureStateMachine;

pub const CAPTURE_UNAVAILABLE_MESSAGE: &str =
    "Voice input is not supported on this device. Please type your message instead.";

/// Owns the capture state and the platform speech capability.
pub struct VoiceController {
    platform: Arc<dyn VoicePlatform>,
    state: CaptureStateMachine,
    feed: Arc<NotificationFeed>,
    events: EventBus,
    language: Mutex<String>,
    params: SpeechParams,
}

impl std::fmt::Debug for VoiceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceController")
            .field("state", &self.state.current())
            .field("language", &self.language())
            .field("params", &self.params)
            .finish()
    }
}

impl VoiceController {
    pub fn new(platform: Arc<dyn VoicePlatform>, feed: Arc<NotificationFeed>, events: EventBus) -> Self {
        Self {
            platform,
            state: CaptureStateMachine::new(),
            feed,
            events,
            language: Mutex::new("en-IN".to_string()),
            params: SpeechParams::default(),
        }
    }

    pub fn with_language(self, language: impl Into<String>) -> Self {
        self.set_language(language);
        self
    }

    pub fn with_params(mut self, params: SpeechParams) -> Self {
        self.params = params;
        self
    }

    pub fn state(&self) -> CaptureState {
        self.state.current()
    }

    pub fn capture_available(&self) -> bool {
        self.platform.capture_available()
    }

    pub fn synthesis_available(&self) -> bool {
        self.platform.synthesis_available()
    }

    pub fn language(&self) -> String {
        self.language.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Language used for the next capture and utterance.
    pub fn set_language(&self, language: impl Into<String>) {
        *self.language.lock().unwrap_or_else(|e| e.into_inner()) = language.into();
    }

    /// Begin capturing speech.
    ///
    /// Without a capture capability this posts one warning notification and
    /// leaves the state Idle. A platform failure while starting is handled
    /// like a capture error.
    pub async fn start_capture(&self) -> Result<(), VoiceError> {
        if !self.platform.capture_available() {
            self.feed.post(CAPTURE_UNAVAILABLE_MESSAGE, Severity::Warning);
            return Err(VoiceError::CaptureUnavailable);
        }

        let from = self.state.transition(CaptureState::Listening)?;
        self.publish_change(from, CaptureState::Listening);

        let language = self.language();
        if let Err(e) = self.platform.start_capture(&language).await {
            let code = match &e {
                VoiceError::Capture(code) => code.clone(),
                other => other.to_string(),
            };
            self.on_error(&code);
            return Err(e);
        }

        info!(language = %language, "Voice capture started");
        Ok(())
    }

    /// Stop capturing. Always leaves the state Idle; safe to call repeatedly.
    pub async fn stop_capture(&self) {
        if self.state.current() == CaptureState::Listening {
            if let Err(e) = self.platform.stop_capture().await {
                warn!(error = %e, "Platform failed to stop capture");
            }
        }
        let from = self.state.reset();
        if from != CaptureState::Idle {
            self.publish_change(from, CaptureState::Idle);
            info!("Voice capture stopped");
        }
    }

    /// Platform delivered a recognition result.
    ///
    /// Returns the trimmed utterance, or `None` if nothing was recognized.
    /// Capture is back in Idle either way.
    pub fn on_result(&self, text: &str) -> Option<String> {
        let from = self.state.reset();
        if from != CaptureState::Idle {
            self.publish_change(from, CaptureState::Idle);
        }

        let text = text.trim();
        if text.is_empty() {
            debug!("Empty recognition result ignored");
            return None;
        }
        info!(chars = text.chars().count(), "Utterance recognized");
        Some(text.to_string())
    }

    /// Platform reported a capture error. Posts an error notification and
    /// returns to Idle.
    pub fn on_error(&self, code: &str) {
        if let Ok(from) = self.state.transition(CaptureState::Error) {
            self.publish_change(from, CaptureState::Error);
        }

        warn!(code = %code, "Voice capture error");
        self.feed.post(
            format!("Voice recognition error: {}", describe_capture_error(code)),
            Severity::Error,
        );

        let from = self.state.reset();
        if from != CaptureState::Idle {
            self.publish_change(from, CaptureState::Idle);
        }
    }

    fn publish_change(&self, from: CaptureState, to: CaptureState) {
        self.events
            .publish(SessionEvent::CaptureStateChanged { from, to });
    }
}

impl SpeechOutput for VoiceController {
    /// Fire-and-forget synthesis. Does nothing without a synthesis capability
    /// or outside a tokio runtime.
    fn speak(&self, text: &str) {
        if !self.platform.synthesis_available() {
            return;
        }
        let text = speakable_text(text);
        if text.is_empty() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime available for speech synthesis");
            return;
        };

        let platform = Arc::clone(&self.platform);
        let language = self.language();
        let params = self.params;
        handle.spawn(async move {
            if let Err(e) = platform.speak(&text, &language, params).await {
                warn!(error = %e, "Speech synthesis failed");
            }
        });
    }
}

/// Human-readable text for common platform error codes.
pub fn describe_capture_error(code: &str) -> String {
    match code {
        "no-speech" => "no speech was detected, please try again".to_string(),
        "audio-capture" => "no microphone was found".to_string(),
        "not-allowed" | "service-not-allowed" => "microphone permission was denied".to_string(),
        "network" => "network error during recognition".to_string(),
        "aborted" => "recognition was aborted".to_string(),
        other => other.to_string(),
    }
}

/// Strip markdown emphasis and collapse whitespace so it is not read aloud.
fn speakable_text(text: &str) -> String {
    text.replace(['*', '#', '_'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
