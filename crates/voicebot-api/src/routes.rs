//! Router setup with all API routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route, CORS for local origins and request
/// tracing.
pub fn create_router(state: AppState) -> Router {
    let port = state.port;
    let origins: Vec<HeaderValue> = [port, port.saturating_add(1)]
        .iter()
        .flat_map(|p| [format!("http://127.0.0.1:{}", p), format!("http://localhost:{}", p)])
        .filter_map(|origin| HeaderValue::from_str(&origin).ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let api = Router::new()
        .route("/languages", get(handlers::languages))
        .route("/language", post(handlers::set_language))
        .route("/state", get(handlers::get_state))
        .route("/chat", post(handlers::chat))
        .route("/transcript", get(handlers::transcript))
        .route("/quick-replies/{index}", post(handlers::choose_quick_reply))
        .route("/notifications", get(handlers::notifications))
        .route(
            "/notifications/read-all",
            post(handlers::mark_all_notifications_read),
        )
        .route(
            "/notifications/{id}/read",
            post(handlers::mark_notification_read),
        )
        .route("/voice/status", get(handlers::voice_status))
        .route("/voice/start", post(handlers::voice_start))
        .route("/voice/stop", post(handlers::voice_stop))
        .route("/voice/result", post(handlers::voice_result))
        .route("/voice/error", post(handlers::voice_error))
        .route("/metrics", get(handlers::metrics))
        .route("/report", post(handlers::generate_report))
        .route("/export", post(handlers::export_data))
        .route("/models", get(handlers::models))
        .route("/offers", get(handlers::offers))
        .route("/stream", get(handlers::stream));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
