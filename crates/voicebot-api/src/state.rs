//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use voicebot_session::SessionController;

/// Shared state handed to every handler through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionController>,
    /// Port the server listens on; used for the CORS allow-list.
    pub port: u16,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(session: Arc<SessionController>, port: u16) -> Self {
        Self {
            session,
            port,
            start_time: Instant::now(),
        }
    }
}
