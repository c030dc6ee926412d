//! API error type and JSON error bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use voicebot_chat::ChatError;
use voicebot_core::VoicebotError;
use voicebot_insight::InsightError;
use voicebot_session::SessionError;
use voicebot_voice::VoiceError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable code, e.g. "bad_request".
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), message = %message, "Request failed");
        }

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let message = err.to_string();
        match err {
            SessionError::Chat(ChatError::EmptyMessage | ChatError::MessageTooLong(_)) => {
                ApiError::BadRequest(message)
            }
            SessionError::Core(VoicebotError::UnsupportedLanguage(_)) => {
                ApiError::BadRequest(message)
            }
            SessionError::NoQuickReply(_) => ApiError::NotFound(message),
            SessionError::Voice(VoiceError::CaptureUnavailable) => {
                ApiError::ServiceUnavailable(message)
            }
            SessionError::Voice(VoiceError::InvalidTransition { .. }) => {
                ApiError::Conflict(message)
            }
            SessionError::Insight(InsightError::Superseded) => ApiError::Conflict(message),
            _ => ApiError::Internal(message),
        }
    }
}
