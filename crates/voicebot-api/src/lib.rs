//! Local HTTP API for the voicebot session.
//!
//! JSON endpoints for chat, transcript, notifications, voice capture,
//! metrics and reports, plus an SSE stream of session events.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
