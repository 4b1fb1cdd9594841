//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/progress", get(http::http_get_progress))
        .route("/api/v1/progress/points", post(http::http_post_points))
        .route("/api/v1/progress/lessons", post(http::http_post_lesson))
        .route("/api/v1/progress/level", post(http::http_post_level))
        .route("/api/v1/progress/badges/check", post(http::http_post_badge_check))
        .route("/api/v1/progress/badges/:badge_id", post(http::http_post_badge))
        .route("/api/v1/curriculum/levels", get(http::http_get_levels))
        .route("/api/v1/lessons/:lesson_id/complete", post(http::http_post_finish_lesson))
        .route("/api/v1/activities/:activity_id/answer", post(http::http_post_answer))
        .route("/api/v1/stats", get(http::http_get_stats))
        .route(
            "/api/v1/onboarding",
            get(http::http_get_onboarding).post(http::http_post_onboarding),
        )
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TutorConfig;
    use crate::storage::{KeyValueStorage, MemoryStorage};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app_with(storage: Arc<MemoryStorage>) -> Router {
        let state = AppState::with_storage(storage, &TutorConfig::default());
        build_router(Arc::new(state))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = app_with(Arc::new(MemoryStorage::new()));
        let (status, json) = call(&app, "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn progress_operations_persist_every_change() {
        let storage = Arc::new(MemoryStorage::new());
        let app = app_with(storage.clone());

        let (_, json) = call(&app, "POST", "/api/v1/progress/points", Some(serde_json::json!({"points": 100}))).await;
        assert_eq!(json["points"], 100);

        let (_, json) = call(&app, "POST", "/api/v1/progress/level", Some(serde_json::json!({"level": 2}))).await;
        assert_eq!(json["level"], 2);
        let (_, json) = call(&app, "POST", "/api/v1/progress/level", Some(serde_json::json!({"level": 1}))).await;
        assert_eq!(json["level"], 2);

        let (status, json) = call(&app, "POST", "/api/v1/progress/badges/check", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["newBadges"], serde_json::json!(["logic-master"]));

        let blob = storage.get("debate-platform-progress").unwrap().unwrap();
        let saved: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(saved["points"], 100);
        assert_eq!(saved["level"], 2);
        assert_eq!(saved["badges"][1]["earned"], true);
    }

    #[tokio::test]
    async fn unknown_badge_is_ignored() {
        let app = app_with(Arc::new(MemoryStorage::new()));
        let (status, json) = call(&app, "POST", "/api/v1/progress/badges/nonexistent", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["badges"].as_array().unwrap().iter().all(|b| b["earned"] == false));
    }

    #[tokio::test]
    async fn finishing_a_lesson_unlocks_the_next_level() {
        let app = app_with(Arc::new(MemoryStorage::new()));
        let (status, json) = call(
            &app,
            "POST",
            "/api/v1/lessons/basics-1/complete",
            Some(serde_json::json!({"pointsEarned": 80})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["unlockedLevels"], serde_json::json!(["arguments"]));
        assert_eq!(json["newBadges"], serde_json::json!(["first-steps"]));

        let (_, levels) = call(&app, "GET", "/api/v1/curriculum/levels", None).await;
        assert_eq!(levels[1]["unlocked"], true);
        assert_eq!(levels[1]["lessons"][0]["unlocked"], true);
        assert_eq!(levels[0]["lessons"][0]["completed"], true);
        assert_eq!(levels[0]["completed"], false);
    }

    #[tokio::test]
    async fn locked_lesson_is_a_conflict() {
        let app = app_with(Arc::new(MemoryStorage::new()));
        let (status, json) = call(
            &app,
            "POST",
            "/api/v1/lessons/arguments-3/complete",
            Some(serde_json::json!({"pointsEarned": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "lesson is locked: arguments-3");

        let (_, progress) = call(&app, "GET", "/api/v1/progress", None).await;
        assert_eq!(progress["completedLessons"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn unknown_lesson_is_not_found() {
        let app = app_with(Arc::new(MemoryStorage::new()));
        let (status, json) = call(
            &app,
            "POST",
            "/api/v1/lessons/ghost/complete",
            Some(serde_json::json!({"pointsEarned": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "unknown lesson: ghost");
    }

    #[tokio::test]
    async fn answers_are_graded() {
        let app = app_with(Arc::new(MemoryStorage::new()));
        let (_, json) = call(
            &app,
            "POST",
            "/api/v1/activities/basics-2-q1/answer",
            Some(serde_json::json!({"answer": "3"})),
        )
        .await;
        assert_eq!(json["verdict"], "incorrect");
        assert_eq!(json["expected"], "2");
    }

    #[tokio::test]
    async fn onboarding_flag_is_stored() {
        let storage = Arc::new(MemoryStorage::new());
        let app = app_with(storage.clone());
        let (_, json) = call(&app, "GET", "/api/v1/onboarding", None).await;
        assert_eq!(json["complete"], false);
        let (status, _) = call(&app, "POST", "/api/v1/onboarding", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(storage.get("debate-onboarding-complete").unwrap().as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn onboarding_write_failure_is_a_server_error() {
        let storage = Arc::new(MemoryStorage::new());
        let app = app_with(storage.clone());
        storage.set_fail_writes(true);
        let (status, json) = call(&app, "POST", "/api/v1/onboarding", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "storage unavailable");
    }
}
