//! HTTP endpoint handlers. These are thin wrappers that forward to the
//! progress store or core logic. Each handler is instrumented.

use std::sync::Arc;
use axum::{extract::{Path, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::TutorError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let store = state.progress.read().await;
  Json(store.record().clone())
}

#[instrument(level = "info", skip(state, body), fields(points = body.points))]
pub async fn http_post_points(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AddPointsIn>,
) -> impl IntoResponse {
  let mut store = state.progress.write().await;
  store.add_points(body.points);
  Json(store.record().clone())
}

#[instrument(level = "info", skip(state, body), fields(lesson_id = %body.lesson_id))]
pub async fn http_post_lesson(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CompleteLessonIn>,
) -> impl IntoResponse {
  let mut store = state.progress.write().await;
  store.complete_lesson(&body.lesson_id);
  Json(store.record().clone())
}

#[instrument(level = "info", skip(state, body), fields(level = body.level))]
pub async fn http_post_level(
  State(state): State<Arc<AppState>>,
  Json(body): Json<UnlockLevelIn>,
) -> impl IntoResponse {
  let mut store = state.progress.write().await;
  store.unlock_level(body.level);
  Json(store.record().clone())
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_badge(
  State(state): State<Arc<AppState>>,
  Path(badge_id): Path<String>,
) -> impl IntoResponse {
  let mut store = state.progress.write().await;
  let changed = store.earn_badge(&badge_id);
  info!(target: "progress", %badge_id, %changed, "HTTP earn_badge applied");
  Json(store.record().clone())
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_badge_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let mut store = state.progress.write().await;
  let new_badges = store.check_badge_eligibility();
  Json(BadgeCheckOut { new_badges, progress: store.record().clone() })
}

#[instrument(level = "info", skip(state, body), fields(%lesson_id, points_earned = body.points_earned))]
pub async fn http_post_finish_lesson(
  State(state): State<Arc<AppState>>,
  Path(lesson_id): Path<String>,
  Json(body): Json<FinishLessonIn>,
) -> Result<Json<LessonCompleteOut>, TutorError> {
  let out = complete_lesson_flow(&state, &lesson_id, body.points_earned).await?;
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(%activity_id))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(activity_id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> Result<impl IntoResponse, TutorError> {
  let grade = grade_activity(&state, &activity_id, &body.answer).await?;
  Ok(Json(grade))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_levels(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let store = state.progress.read().await;
  Json(level_views(&state.curriculum, store.record()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let store = state.progress.read().await;
  Json(stats(&state.curriculum, store.record()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_onboarding(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(OnboardingOut { complete: state.onboarding_complete() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_onboarding(State(state): State<Arc<AppState>>) -> Result<Json<OnboardingOut>, TutorError> {
  state.mark_onboarding_complete()?;
  Ok(Json(OnboardingOut { complete: true }))
}
