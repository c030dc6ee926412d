//! Voice I/O for the voicebot session.
//!
//! Owns the single capture state machine (Idle -> Listening -> Idle, with a
//! transient Error state on platform failures) and fire-and-forget speech
//! synthesis. Both platform capabilities are optional; without capture the
//! session degrades to typed input only.

pub mod controller;
pub mod error;
pub mod platform;
pub mod state;

pub use controller::VoiceController;
pub use error::VoiceError;
pub use platform::{DelegatedPlatform, NullPlatform, SpeechParams, VoicePlatform};
pub use state::CaptureStateMachine;
