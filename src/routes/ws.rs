//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to the progress store or core logic. We reply with a single JSON
//! message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "debate_tutor", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "debate_tutor", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = reply_to_text(&txt, &state).await;
        if let Err(e) = socket.send(Message::Text(reply)).await {
          error!(target: "debate_tutor", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "debate_tutor", "WebSocket disconnected");
}

/// Parse, dispatch, serialize one text frame.
async fn reply_to_text(txt: &str, state: &AppState) -> String {
  let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "debate_tutor", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  };

  serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::GetProgress => {
      let store = state.progress.read().await;
      ServerWsMessage::Progress { progress: store.record().clone() }
    }

    ClientWsMessage::AddPoints { points } => {
      let mut store = state.progress.write().await;
      store.add_points(points);
      ServerWsMessage::Progress { progress: store.record().clone() }
    }

    ClientWsMessage::CompleteLesson { lesson_id } => {
      let mut store = state.progress.write().await;
      store.complete_lesson(&lesson_id);
      ServerWsMessage::Progress { progress: store.record().clone() }
    }

    ClientWsMessage::UnlockLevel { level } => {
      let mut store = state.progress.write().await;
      store.unlock_level(level);
      ServerWsMessage::Progress { progress: store.record().clone() }
    }

    ClientWsMessage::EarnBadge { badge_id } => {
      let mut store = state.progress.write().await;
      store.earn_badge(&badge_id);
      ServerWsMessage::Progress { progress: store.record().clone() }
    }

    ClientWsMessage::CheckBadges => {
      let mut store = state.progress.write().await;
      let new_badges = store.check_badge_eligibility();
      ServerWsMessage::BadgesChecked { new_badges, progress: store.record().clone() }
    }

    ClientWsMessage::FinishLesson { lesson_id, points_earned } => {
      match complete_lesson_flow(state, &lesson_id, points_earned).await {
        Ok(result) => ServerWsMessage::LessonComplete { result },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::SubmitActivity { activity_id, answer } => {
      match grade_activity(state, &activity_id, &answer).await {
        Ok(grade) => ServerWsMessage::ActivityResult { activity_id, grade },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::GetStats => {
      let store = state.progress.read().await;
      ServerWsMessage::Stats { stats: stats(&state.curriculum, store.record()) }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::TutorConfig;
  use crate::storage::MemoryStorage;

  fn state() -> AppState {
    AppState::with_storage(Arc::new(MemoryStorage::new()), &TutorConfig::default())
  }

  async fn roundtrip(state: &AppState, msg: &str) -> serde_json::Value {
    serde_json::from_str(&reply_to_text(msg, state).await).unwrap()
  }

  #[tokio::test]
  async fn invalid_json_yields_error_message() {
    let st = state();
    let v = roundtrip(&st, "{nope").await;
    assert_eq!(v["type"], "error");
    assert!(v["message"].as_str().unwrap().starts_with("Invalid JSON"));
  }

  #[tokio::test]
  async fn progress_messages_mutate_the_record() {
    let st = state();
    roundtrip(&st, r#"{"type":"complete_lesson","lessonId":"basics-1-q1"}"#).await;
    roundtrip(&st, r#"{"type":"add_points","points":20}"#).await;
    let v = roundtrip(&st, r#"{"type":"check_badges"}"#).await;

    assert_eq!(v["type"], "badges_checked");
    assert_eq!(v["newBadges"], serde_json::json!(["first-steps"]));
    assert_eq!(v["progress"]["points"], 20);
    assert_eq!(v["progress"]["completedLessons"], serde_json::json!(["basics-1-q1"]));
  }

  #[tokio::test]
  async fn finish_lesson_reports_unknown_lesson() {
    let st = state();
    let v = roundtrip(&st, r#"{"type":"finish_lesson","lessonId":"ghost","pointsEarned":5}"#).await;
    assert_eq!(v["type"], "error");
    assert_eq!(v["message"], "unknown lesson: ghost");
  }

  #[tokio::test]
  async fn submit_activity_grades_orderings() {
    let st = state();
    let v = roundtrip(
      &st,
      r#"{"type":"submit_activity","activityId":"basics-3-structure","answer":["Claim","Evidence","Reasoning","Impact"]}"#,
    )
    .await;
    assert_eq!(v["type"], "activity_result");
    assert_eq!(v["grade"]["verdict"], "correct");
    assert_eq!(v["grade"]["points"], 30);
  }
}
