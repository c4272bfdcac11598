//! Error taxonomy for the grading core.
//!
//! Three families matter here:
//!   - input/validation faults inside variable generation are NOT errors at
//!     this level; they are collected as per-variable diagnostic strings and
//!     shown alongside the rendered question,
//!   - configuration faults (a missing token value) abort the settle pass,
//!   - judge faults are wrapped so callers can tell "evaluation unavailable"
//!     apart from a wrong grade.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::Difficulty;

#[derive(Debug, Error)]
pub enum CoreError {
  #[error("unknown {0}: {1}")]
  NotFound(&'static str, String),

  #[error("submission not allowed: {0}")]
  NotAllowed(String),

  /// No token value is configured for (category, difficulty). Surfaced at
  /// credit time instead of defaulting, since a guessed value would corrupt
  /// the reward ledger.
  #[error("no token value configured for category '{category}' at difficulty {difficulty}")]
  MissingTokenValue { category: String, difficulty: Difficulty },

  #[error(transparent)]
  Judge(#[from] JudgeError),
}

/// Faults raised by the external code-execution judge client.
#[derive(Debug, Error)]
pub enum JudgeError {
  #[error("judge transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("judge HTTP {status}: {body}")]
  Http { status: u16, body: String },

  #[error("malformed judge response: {0}")]
  Malformed(String),
}

impl IntoResponse for CoreError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      CoreError::NotFound(..) => (StatusCode::NOT_FOUND, self.to_string()),
      CoreError::NotAllowed(..) => (StatusCode::FORBIDDEN, self.to_string()),
      CoreError::MissingTokenValue { .. } => {
        tracing::error!(target: "praxis_backend", error = %self, "Reward ledger configuration fault");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
      }
      CoreError::Judge(e) => {
        tracing::error!(target: "praxis_backend", error = %e, "Judge unavailable");
        (StatusCode::BAD_GATEWAY, "evaluation pending: judge unavailable".to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
