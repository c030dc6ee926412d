pub mod config;
pub mod error;
pub mod events;
pub mod speech;
pub mod types;

pub use config::VoicebotConfig;
pub use error::{Result, VoicebotError};
pub use events::{EventBus, SessionEvent};
pub use speech::{SilentSpeech, SpeechOutput};
pub use types::*;
