//! Integration tests for the voicebot API. Each test drives a fresh router
//! over an offline session: no voice platform, no chat service, mock data.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use voicebot_api::handlers::{HealthResponse, UiStateResponse, VoiceStatusResponse};
use voicebot_api::{create_router, AppState};
use voicebot_core::{CaptureState, View, VoicebotConfig};
use voicebot_insight::{ChartImage, ChartRenderer, ChartSpec, InsightError, SvgChartRenderer};
use voicebot_session::{Collaborators, SessionController};

// =============================================================================
// Helpers
// =============================================================================

fn make_state() -> AppState {
    let session =
        SessionController::new(&VoicebotConfig::default(), Collaborators::offline()).unwrap();
    AppState::new(Arc::new(session), 3040)
}

/// Renders normally after a fixed delay per chart.
struct SlowCharts(Duration);

#[async_trait]
impl ChartRenderer for SlowCharts {
    async fn render(&self, spec: &ChartSpec) -> Result<ChartImage, InsightError> {
        tokio::time::sleep(self.0).await;
        SvgChartRenderer::default().render(spec).await
    }
}

fn make_app() -> axum::Router {
    create_router(make_state())
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

// =============================================================================
// Health and static data
// =============================================================================

#[tokio::test]
async fn test_health() {
    let resp = make_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn test_languages() {
    let resp = make_app().oneshot(get("/api/languages")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["active"], "en-IN");
    assert_eq!(json["languages"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_models_and_offers() {
    let app = make_app();
    let models = body_json(app.clone().oneshot(get("/api/models")).await.unwrap()).await;
    assert_eq!(models.as_array().unwrap().len(), 12);

    let offers = body_json(app.oneshot(get("/api/offers")).await.unwrap()).await;
    assert!(!offers.as_array().unwrap().is_empty());
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat_reply_uses_fallback() {
    let app = make_app();
    let resp = app
        .clone()
        .oneshot(post_json("/api/chat", r#"{"message": "I want to book a test ride"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["kind"], "reply");
    assert_eq!(json["entry"]["speaker"], "assistant");
    assert_eq!(json["entry"]["source"], "fallback");

    let transcript = body_json(app.oneshot(get("/api/transcript")).await.unwrap()).await;
    let entries = transcript["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["input_modality"], "typed");
    assert!(transcript["quick_replies"].is_null());
}

#[tokio::test]
async fn test_chat_command_switches_view() {
    let app = make_app();
    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/chat",
            r#"{"message": "please show dashboard now", "modality": "voice"}"#,
        ))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["kind"], "command");
    assert_eq!(json["action"], "show_dashboard");

    let resp = app.clone().oneshot(get("/api/state")).await.unwrap();
    let state: UiStateResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(state.view, View::Dashboard);

    let transcript = body_json(app.oneshot(get("/api/transcript")).await.unwrap()).await;
    assert!(transcript["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_empty_message() {
    let resp = make_app()
        .oneshot(post_json("/api/chat", r#"{"message": "   "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn test_quick_reply_missing() {
    let resp = make_app()
        .oneshot(post_empty("/api/quick-replies/0"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_language() {
    let app = make_app();
    let resp = app
        .clone()
        .oneshot(post_json("/api/language", r#"{"language": "hi-IN"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["language"], "hi-IN");

    let resp = app
        .oneshot(post_json("/api/language", r#"{"language": "xx-XX"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Voice and notifications
// =============================================================================

#[tokio::test]
async fn test_voice_unavailable() {
    let app = make_app();
    let resp = app.clone().oneshot(get("/api/voice/status")).await.unwrap();
    let status: VoiceStatusResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(status.state, CaptureState::Idle);
    assert!(!status.capture_available);

    let resp = app.clone().oneshot(post_empty("/api/voice/start")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let notes = body_json(app.oneshot(get("/api/notifications")).await.unwrap()).await;
    assert_eq!(notes["unread"], 1);
    assert_eq!(notes["notifications"][0]["severity"], "warning");
}

#[tokio::test]
async fn test_voice_stop_is_idempotent() {
    let app = make_app();
    for _ in 0..2 {
        let resp = app.clone().oneshot(post_empty("/api/voice/stop")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_mark_notification_read() {
    let app = make_app();
    app.clone()
        .oneshot(post_empty("/api/voice/start"))
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(post_empty("/api/notifications/1/read"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["unread"], 0);
    assert_eq!(json["notifications"][0]["read"], true);

    let resp = app
        .oneshot(post_empty("/api/notifications/99/read"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Metrics, reports, export
// =============================================================================

#[tokio::test]
async fn test_metrics() {
    let resp = make_app().oneshot(get("/api/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert!(json["conversations"].as_u64().unwrap() > 0);
    assert!(json["conversion_percent"].as_f64().is_some());
}

#[tokio::test]
async fn test_generate_report() {
    let app = make_app();
    let resp = app.clone().oneshot(post_empty("/api/report")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert!(json["file_name"]
        .as_str()
        .unwrap()
        .starts_with("voicebot-report-"));
    assert_eq!(json["page_count"], 5);

    let notes = body_json(app.oneshot(get("/api/notifications")).await.unwrap()).await;
    assert_eq!(notes["notifications"][0]["severity"], "success");
}

#[tokio::test]
async fn test_superseded_report_is_conflict() {
    let session = SessionController::new(
        &VoicebotConfig::default(),
        Collaborators {
            charts: Arc::new(SlowCharts(Duration::from_millis(50))),
            ..Collaborators::offline()
        },
    )
    .unwrap();
    let app = create_router(AppState::new(Arc::new(session), 3040));

    let first = tokio::spawn(app.clone().oneshot(post_empty("/api/report")));
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = app.clone().oneshot(post_empty("/api/report")).await.unwrap();

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(first).await["error"], "conflict");
    assert_eq!(second.status(), StatusCode::OK);

    let notes = body_json(app.oneshot(get("/api/notifications")).await.unwrap()).await;
    assert_eq!(notes["notifications"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_export() {
    let resp = make_app().oneshot(post_empty("/api/export")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert!(json["file_name"]
        .as_str()
        .unwrap()
        .starts_with("voicebot-export-"));
}

#[tokio::test]
async fn test_unknown_route() {
    let resp = make_app().oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
