//! Route handler functions for all API endpoints.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use voicebot_chat::QuickReplies;
use voicebot_core::{
    CaptureState, InputModality, Language, MetricsSnapshot, Notification, Theme, TranscriptEntry,
    View, SUPPORTED_LANGUAGES,
};
use voicebot_insight::{BikeModel, Offer, ReportOutcome, CATALOGUE, OFFERS};
use voicebot_session::UtteranceOutcome;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    pub message: String,
    #[serde(default)]
    pub modality: Option<InputModality>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct CaptureResultRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct CaptureErrorRequest {
    pub code: String,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub active: String,
    pub languages: &'static [Language],
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub entries: Vec<TranscriptEntry>,
    pub quick_replies: Option<QuickReplies>,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub unread: usize,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceStatusResponse {
    pub state: CaptureState,
    pub capture_available: bool,
    pub synthesis_available: bool,
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub snapshot: MetricsSnapshot,
    pub conversion_percent: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UiStateResponse {
    pub view: View,
    pub theme: Theme,
    pub language: String,
    pub report_in_progress: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportResponse {
    pub file_name: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /api/languages
pub async fn languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        active: state.session.language(),
        languages: SUPPORTED_LANGUAGES,
    })
}

/// POST /api/language
pub async fn set_language(
    State(state): State<AppState>,
    Json(req): Json<LanguageRequest>,
) -> Result<Json<UiStateResponse>, ApiError> {
    state.session.set_language(&req.language)?;
    Ok(Json(ui_state(&state)))
}

/// GET /api/state
pub async fn get_state(State(state): State<AppState>) -> Json<UiStateResponse> {
    Json(ui_state(&state))
}

fn ui_state(state: &AppState) -> UiStateResponse {
    UiStateResponse {
        view: state.session.view(),
        theme: state.session.theme(),
        language: state.session.language(),
        report_in_progress: state.session.is_compiling_report(),
    }
}

/// POST /api/chat - run a message through command recognition, then dispatch.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatMessageRequest>,
) -> Result<Json<UtteranceOutcome>, ApiError> {
    let modality = req.modality.unwrap_or_default();
    let outcome = state.session.handle_utterance(&req.message, modality).await?;
    Ok(Json(outcome))
}

/// GET /api/transcript
pub async fn transcript(State(state): State<AppState>) -> Json<TranscriptResponse> {
    let transcript = state.session.transcript();
    Json(TranscriptResponse {
        entries: transcript.entries(),
        quick_replies: transcript.quick_replies(),
    })
}

/// POST /api/quick-replies/{index}
pub async fn choose_quick_reply(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<TranscriptEntry>, ApiError> {
    let entry = state.session.choose_quick_reply(index).await?;
    Ok(Json(entry))
}

/// GET /api/notifications
pub async fn notifications(State(state): State<AppState>) -> Json<NotificationsResponse> {
    let feed = state.session.feed();
    Json(NotificationsResponse {
        unread: feed.unread_count(),
        notifications: feed.list(),
    })
}

/// POST /api/notifications/{id}/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    if !state.session.feed().mark_read(id) {
        return Err(ApiError::NotFound(format!("notification {} not found", id)));
    }
    Ok(notifications(State(state)).await)
}

/// POST /api/notifications/read-all
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
) -> Json<NotificationsResponse> {
    state.session.feed().mark_all_read();
    notifications(State(state)).await
}

/// GET /api/voice/status
pub async fn voice_status(State(state): State<AppState>) -> Json<VoiceStatusResponse> {
    let voice = state.session.voice();
    Json(VoiceStatusResponse {
        state: voice.state(),
        capture_available: voice.capture_available(),
        synthesis_available: voice.synthesis_available(),
        language: voice.language(),
    })
}

/// POST /api/voice/start
pub async fn voice_start(
    State(state): State<AppState>,
) -> Result<Json<VoiceStatusResponse>, ApiError> {
    state.session.start_listening().await?;
    Ok(voice_status(State(state)).await)
}

/// POST /api/voice/stop
pub async fn voice_stop(State(state): State<AppState>) -> Json<VoiceStatusResponse> {
    state.session.stop_listening().await;
    voice_status(State(state)).await
}

/// POST /api/voice/result - the platform adapter delivers recognized text.
pub async fn voice_result(
    State(state): State<AppState>,
    Json(req): Json<CaptureResultRequest>,
) -> Result<Json<Option<UtteranceOutcome>>, ApiError> {
    let outcome = state.session.handle_capture_result(&req.text).await?;
    Ok(Json(outcome))
}

/// POST /api/voice/error - the platform adapter reports a capture error.
pub async fn voice_error(
    State(state): State<AppState>,
    Json(req): Json<CaptureErrorRequest>,
) -> Json<VoiceStatusResponse> {
    state.session.handle_capture_error(&req.code);
    voice_status(State(state)).await
}

/// GET /api/metrics
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let snapshot = state.session.metrics();
    Json(MetricsResponse {
        conversion_percent: snapshot.conversion_percent(),
        snapshot,
    })
}

/// POST /api/report - compile a report; 409 when a newer request superseded it.
pub async fn generate_report(
    State(state): State<AppState>,
) -> Result<Json<ReportOutcome>, ApiError> {
    let outcome = state.session.compile_report().await?;
    Ok(Json(outcome))
}

/// POST /api/export
pub async fn export_data(State(state): State<AppState>) -> Result<Json<ExportResponse>, ApiError> {
    let file_name = state.session.export_data().await?;
    Ok(Json(ExportResponse { file_name }))
}

/// GET /api/models
pub async fn models() -> Json<&'static [BikeModel]> {
    Json(CATALOGUE)
}

/// GET /api/offers
pub async fn offers() -> Json<&'static [Offer]> {
    Json(OFFERS)
}

/// GET /api/stream - session events as server-sent events.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>> + Send> {
    let rx = state.session.events().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().event(event.event_name()).data(data)))
        }
        // A lagging client skips what it missed.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
