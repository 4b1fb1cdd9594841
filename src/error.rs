//! Service error type and its HTTP mapping.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;

use crate::protocol::ErrorOut;

#[derive(Debug, Error)]
pub enum TutorError {
  #[error("unknown lesson: {0}")]
  UnknownLesson(String),
  #[error("unknown activity: {0}")]
  UnknownActivity(String),
  #[error("lesson is locked: {0}")]
  LessonLocked(String),
  #[error(transparent)]
  Storage(#[from] crate::storage::StorageError),
}

impl TutorError {
  pub fn status(&self) -> StatusCode {
    match self {
      TutorError::UnknownLesson(_) | TutorError::UnknownActivity(_) => StatusCode::NOT_FOUND,
      TutorError::LessonLocked(_) => StatusCode::CONFLICT,
      TutorError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for TutorError {
  fn into_response(self) -> Response {
    (self.status(), Json(ErrorOut { error: self.to_string() })).into_response()
  }
}
