//! HTTP endpoint handlers. These are thin wrappers that forward to the core
//! pipeline; serialization stays in `protocol`.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::error::CoreError;
use crate::pipeline;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let categories = state.categories.read().await;
  let questions = state.questions.read().await;

  let direct_count = |id: &str| {
    questions.values().filter(|q| q.category.as_deref() == Some(id)).count()
  };

  let mut out: Vec<CategoryOut> = categories
    .values()
    .map(|c| {
      // Root categories count the questions of their children; leaves count
      // their own.
      let num_questions = if c.parent.is_none() {
        categories
          .values()
          .filter(|child| child.parent.as_deref() == Some(c.id.as_str()))
          .map(|child| direct_count(&child.id))
          .sum()
      } else {
        direct_count(&c.id)
      };
      CategoryOut {
        id: c.id.clone(),
        name: c.name.clone(),
        description: c.description.clone(),
        parent: c.parent.clone(),
        num_questions,
        next_categories: c.next_categories.clone(),
      }
    })
    .collect();
  out.sort_by(|a, b| a.id.cmp(&b.id));
  Json(out)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_questions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let questions = state.questions.read().await;
  let mut out: Vec<QuestionSummaryOut> = questions
    .values()
    .map(|q| QuestionSummaryOut {
      id: q.id.clone(),
      title: q.title.clone(),
      question_type: q.kind.type_name(),
      difficulty: q.difficulty,
      category: q.category.clone(),
      is_verified: q.is_verified,
      event: q.event.clone(),
    })
    .collect();
  out.sort_by(|a, b| a.id.cmp(&b.id));
  Json(out)
}

#[instrument(level = "info", skip(state), fields(%q.question_id, %q.user_id))]
pub async fn http_get_question(
  State(state): State<Arc<AppState>>,
  Query(q): Query<QuestionViewQuery>,
) -> Result<Json<QuestionView>, CoreError> {
  let view = pipeline::question_view(&state, &q.user_id, &q.question_id).await?;
  info!(target: "grading", question = %q.question_id, user = %q.user_id, status = view.status,
        "Question view served");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state, body), fields(%body.user_id, %body.question_id))]
pub async fn http_post_tutorial(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TutorialIn>,
) -> Result<Json<TutorialOut>, CoreError> {
  state.ensure_junction(&body.user_id, &body.question_id).await;
  let opened = state.open_tutorial(&body.user_id, &body.question_id).await;
  Ok(Json(TutorialOut { opened_tutorial: opened }))
}

#[instrument(level = "info", skip(state, body),
             fields(%body.user_id, %body.question_id, answer_len = body.answer.len()))]
pub async fn http_post_submission(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SubmissionIn>,
) -> Result<Json<SubmissionOut>, CoreError> {
  let submission =
    pipeline::create_submission(&state, &body.user_id, &body.question_id, body.answer, body.files)
      .await?;
  info!(target: "grading", submission = %submission.id, status = submission.status(),
        grade = submission.grade, "Submission created");
  Ok(Json(pipeline::submission_out(&state, &submission).await))
}

#[instrument(level = "info", skip(state), fields(%q.submission_id))]
pub async fn http_get_submission(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SubmissionQuery>,
) -> Result<Json<SubmissionOut>, CoreError> {
  let submission = pipeline::refresh_submission(&state, &q.submission_id).await?;
  Ok(Json(pipeline::submission_out(&state, &submission).await))
}

#[instrument(level = "info", skip(state, body), fields(%body.submission_id, entries = body.results.len()))]
pub async fn http_post_judge_callback(
  State(state): State<Arc<AppState>>,
  Json(body): Json<JudgeCallbackIn>,
) -> Result<Json<SubmissionOut>, CoreError> {
  let submission =
    pipeline::ingest_judge_results(&state, &body.submission_id, body.results).await?;
  info!(target: "grading", submission = %submission.id, status = submission.status(),
        "Judge callback ingested");
  Ok(Json(pipeline::submission_out(&state, &submission).await))
}

#[instrument(level = "info", skip(state), fields(%q.user_id))]
pub async fn http_get_actions(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ActionsQuery>,
) -> impl IntoResponse {
  Json(state.actions_for(&q.user_id).await)
}
