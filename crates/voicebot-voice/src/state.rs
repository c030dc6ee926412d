//! Capture state machine with thread-safe transitions.
//!
//! Valid transitions:
//! - Idle -> Listening (start capture)
//! - Listening -> Idle (result received or capture stopped)
//! - Listening -> Error (platform reported an error)
//! - Error -> Idle (recovery, always immediate)

use std::sync::{Arc, Mutex};

use voicebot_core::CaptureState;

use crate::error::VoiceError;

/// Thread-safe wrapper around the single [`CaptureState`] of a session.
#[derive(Debug, Clone, Default)]
pub struct CaptureStateMachine {
    state: Arc<Mutex<CaptureState>>,
}

impl CaptureStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> CaptureState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Attempt to move to `target`, returning the previous state.
    pub fn transition(&self, target: CaptureState) -> Result<CaptureState, VoiceError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let from = *state;
        if from.can_transition_to(&target) {
            tracing::debug!("Capture state: {} -> {}", from, target);
            *state = target;
            Ok(from)
        } else {
            Err(VoiceError::InvalidTransition { from, to: target })
        }
    }

    /// Force the machine back to Idle, returning the previous state.
    pub fn reset(&self) -> CaptureState {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let from = *state;
        if from != CaptureState::Idle {
            tracing::debug!("Capture state reset to Idle from {}", from);
        }
        *state = CaptureState::Idle;
        from
    }
}
