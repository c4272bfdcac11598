//! Core behaviors shared by the HTTP handlers: question rendering and the
//! submission state machine.
//!
//! Every write of a submission runs the same explicit orchestration:
//!   1) grade,
//!   2) finalize if the evaluation has settled,
//!   3) credit the token ledger if the settled result qualifies,
//!   4) recompute the junction's aggregate flags.
//! Steps 1, 2 and 4 are idempotent. Step 3 is not (it appends an audit
//! action), so it runs only on the flip of `finalized`, and every settle
//! pass holds the grade-book write lock for its whole critical section, so
//! two concurrent polls of the same submission cannot both observe the
//! flip. Once finalized, a submission's grading fields never change.

use tracing::{info, instrument, warn};

use crate::domain::{
  Question, QuestionKind, SourceFile, Submission, SubmissionKind, TestCaseResult,
};
use crate::error::CoreError;
use crate::grader::grader_for;
use crate::ledger;
use crate::protocol::{QuestionView, SubmissionOut};
use crate::report;
use crate::state::{AppState, GradeBook};
use crate::variables::{generate_variables, render_text, visible_choices};

/// Create a submission for (user, question), grade it, and (for code
/// questions) dispatch it to the external judge. Synchronous kinds settle
/// before this returns; asynchronous kinds come back in "Evaluating".
#[instrument(level = "info", skip(state, answer, files), fields(%user_id, %question_id, answer_len = answer.len()))]
pub async fn create_submission(
  state: &AppState,
  user_id: &str,
  question_id: &str,
  answer: String,
  files: Vec<SourceFile>,
) -> Result<Submission, CoreError> {
  let user = state
    .user(user_id)
    .await
    .ok_or_else(|| CoreError::NotFound("user", user_id.to_string()))?;
  let question = state
    .question(question_id)
    .await
    .ok_or_else(|| CoreError::NotFound("question", question_id.to_string()))?;
  let event = state.event_for(&question).await;
  let junction = state.ensure_junction(user_id, question_id).await;

  let mut submission = match &question.kind {
    QuestionKind::Code { .. } => Submission::new(
      user_id.to_string(),
      question_id.to_string(),
      answer,
      SubmissionKind::Code { judge_tokens: vec![], results: vec![], files },
    ),
    _ => Submission::new(
      user_id.to_string(),
      question_id.to_string(),
      answer,
      SubmissionKind::MultipleChoice,
    ),
  };

  // Dispatch happens outside the grade-book lock; a judge fault leaves the
  // submission with no entries, which keeps it in "Evaluating" for retry.
  if matches!(question.kind, QuestionKind::Code { .. }) {
    let (values, _) = generate_variables(&question.variables, junction.seed);
    match &state.judge {
      Some(judge) => match judge.dispatch(&question, &submission, &values).await {
        Ok(results) => {
          if let SubmissionKind::Code { judge_tokens, results: slot, .. } = &mut submission.kind {
            *judge_tokens = results.iter().filter_map(|r| r.token.clone()).collect();
            *slot = results;
          }
        }
        Err(e) => {
          warn!(target: "grading", submission = %submission.id, error = %e,
                "Judge dispatch failed; submission stays in evaluation");
        }
      },
      None => {
        warn!(target: "grading", submission = %submission.id,
              "No judge configured; code submission stays in evaluation");
      }
    }
  }

  let token_value = state.token_value(question.category.as_deref(), question.difficulty).await;
  let is_exam = question.is_exam(event.as_ref());

  let mut book = state.grade_book.write().await;
  let key = (user_id.to_string(), question_id.to_string());
  let attempts = book.attempts(user_id, question_id);
  let junction = match book.junctions.get(&key) {
    Some(j) => j.clone(),
    None => junction,
  };
  if !junction.can_submit(&user, &question, event.as_ref(), attempts) {
    return Err(CoreError::NotAllowed(format!(
      "user '{}' may not submit to question '{}'",
      user.id, question.id
    )));
  }
  book.submissions.insert(submission.id.clone(), submission.clone());
  settle_locked(&mut book, &submission.id, &question, is_exam, token_value)
}

/// Re-check an in-flight submission: poll the judge for fresh entries, then
/// run the settle pass. Safe to call arbitrarily often; a finalized
/// submission is returned unchanged.
#[instrument(level = "info", skip(state), fields(%submission_id))]
pub async fn refresh_submission(
  state: &AppState,
  submission_id: &str,
) -> Result<Submission, CoreError> {
  let current = state
    .submission(submission_id)
    .await
    .ok_or_else(|| CoreError::NotFound("submission", submission_id.to_string()))?;
  if current.finalized {
    return Ok(current);
  }

  let question = state
    .question(&current.question_id)
    .await
    .ok_or_else(|| CoreError::NotFound("question", current.question_id.clone()))?;
  let event = state.event_for(&question).await;

  let mut fetched: Option<Vec<TestCaseResult>> = None;
  if let (SubmissionKind::Code { judge_tokens, .. }, Some(judge)) = (&current.kind, &state.judge) {
    if !judge_tokens.is_empty() {
      match judge.fetch_results(judge_tokens).await {
        Ok(results) if !results.is_empty() => fetched = Some(results),
        Ok(_) => {}
        Err(e) => {
          warn!(target: "grading", submission = %submission_id, error = %e,
                "Judge poll failed; submission stays in evaluation");
        }
      }
    }
  }

  let token_value = state.token_value(question.category.as_deref(), question.difficulty).await;
  let is_exam = question.is_exam(event.as_ref());

  let mut book = state.grade_book.write().await;
  if let Some(results) = fetched {
    attach_results(&mut book, submission_id, results);
  }
  settle_locked(&mut book, submission_id, &question, is_exam, token_value)
}

/// Entry point for results pushed by the judge (callback) instead of pulled
/// by polling. Runs the same settle pass afterwards.
#[instrument(level = "info", skip(state, results), fields(%submission_id, entries = results.len()))]
pub async fn ingest_judge_results(
  state: &AppState,
  submission_id: &str,
  results: Vec<TestCaseResult>,
) -> Result<Submission, CoreError> {
  let current = state
    .submission(submission_id)
    .await
    .ok_or_else(|| CoreError::NotFound("submission", submission_id.to_string()))?;
  if !matches!(current.kind, SubmissionKind::Code { .. }) {
    return Err(CoreError::NotAllowed(
      "judge results are only accepted for code submissions".into(),
    ));
  }
  let question = state
    .question(&current.question_id)
    .await
    .ok_or_else(|| CoreError::NotFound("question", current.question_id.clone()))?;
  let event = state.event_for(&question).await;
  let token_value = state.token_value(question.category.as_deref(), question.difficulty).await;
  let is_exam = question.is_exam(event.as_ref());

  let mut book = state.grade_book.write().await;
  attach_results(&mut book, submission_id, results);
  settle_locked(&mut book, submission_id, &question, is_exam, token_value)
}

fn attach_results(book: &mut GradeBook, submission_id: &str, results: Vec<TestCaseResult>) {
  if let Some(sub) = book.submissions.get_mut(submission_id) {
    // A finalized submission keeps its settled payload; late results from a
    // lost poll race are dropped.
    if !sub.finalized {
      if let SubmissionKind::Code { results: slot, .. } = &mut sub.kind {
        *slot = results;
      }
    }
  }
}

/// The settle pass. Must run under the grade-book write lock.
fn settle_locked(
  book: &mut GradeBook,
  submission_id: &str,
  question: &Question,
  is_exam: bool,
  token_value: Option<f64>,
) -> Result<Submission, CoreError> {
  let mut submission = book
    .submissions
    .get(submission_id)
    .cloned()
    .ok_or_else(|| CoreError::NotFound("submission", submission_id.to_string()))?;

  if !submission.finalized {
    let (correct, grade) = grader_for(&question.kind).grade(&submission, question);
    submission.is_correct = correct;
    submission.grade = grade;
    submission.is_partially_correct = !correct && grade > 0.0;

    if !submission.in_progress() {
      let qualifies = submission.is_correct || submission.is_partially_correct || is_exam;
      if qualifies {
        // Resolve before flipping `finalized`: a missing token value must
        // not consume the one-time settle transition. The caller can retry
        // once the (category, difficulty) pair is configured.
        let value = token_value.ok_or_else(|| CoreError::MissingTokenValue {
          category: question.category.clone().unwrap_or_else(|| "uncategorized".into()),
          difficulty: question.difficulty,
        })?;
        submission.finalized = true;
        let key = (submission.user_id.clone(), submission.question_id.clone());
        if let Some(junction) = book.junctions.get_mut(&key) {
          if let Some(action) = ledger::apply_credit(junction, &submission, question, value, is_exam) {
            info!(target: "grading", submission = %submission.id, actor = %action.actor,
                  tokens = action.token_change, "Tokens credited");
            book.actions.push(action);
          }
        }
      } else {
        submission.finalized = true;
      }
    }
    book.submissions.insert(submission.id.clone(), submission.clone());
  }

  let key = (submission.user_id.clone(), submission.question_id.clone());
  if let Some(mut junction) = book.junctions.get(&key).cloned() {
    junction.recompute(
      book
        .submissions
        .values()
        .filter(|s| s.user_id == key.0 && s.question_id == key.1),
    );
    book.junctions.insert(key, junction);
  }

  Ok(submission)
}

/// Per-user rendered view of a question: body and choices with the
/// junction's variables substituted, plus status and eligibility context.
/// Marks the junction viewed.
#[instrument(level = "info", skip(state), fields(%user_id, %question_id))]
pub async fn question_view(
  state: &AppState,
  user_id: &str,
  question_id: &str,
) -> Result<QuestionView, CoreError> {
  let user = state
    .user(user_id)
    .await
    .ok_or_else(|| CoreError::NotFound("user", user_id.to_string()))?;
  let question = state
    .question(question_id)
    .await
    .ok_or_else(|| CoreError::NotFound("question", question_id.to_string()))?;
  let event = state.event_for(&question).await;

  let junction = state.ensure_junction(user_id, question_id).await;
  state.mark_viewed(user_id, question_id).await;

  let (values, variable_errors) = generate_variables(&question.variables, junction.seed);
  let text = render_text(&question.text, &values);
  let choices = match &question.kind {
    QuestionKind::MultipleChoice { choices, visible_distractors }
    | QuestionKind::Checkbox { choices, visible_distractors } => {
      visible_choices(choices, *visible_distractors, junction.seed, &values)
    }
    QuestionKind::Code { .. } => Vec::new(),
  };
  let tutorial = if junction.opened_tutorial {
    question.tutorial.as_deref().map(|t| render_text(t, &values))
  } else {
    None
  };

  let (attempts, junction) = {
    let book = state.grade_book.read().await;
    let key = (user_id.to_string(), question_id.to_string());
    let attempts = book.attempts(user_id, question_id);
    let junction = match book.junctions.get(&key) {
      Some(j) => j.clone(),
      None => junction,
    };
    (attempts, junction)
  };
  let token_value = state.token_value(question.category.as_deref(), question.difficulty).await;
  let can_submit = junction.can_submit(&user, &question, event.as_ref(), attempts);

  Ok(QuestionView {
    id: question.id.clone(),
    title: question.title.clone(),
    text,
    question_type: question.kind.type_name(),
    difficulty: question.difficulty,
    category: question.category.clone(),
    choices,
    variable_errors,
    tutorial,
    status: junction.status(attempts),
    attempts_used: format!("Used {} out of {}", attempts, question.max_submissions),
    tokens_received: junction.tokens_received,
    token_value,
    can_submit,
  })
}

/// DTO assembly for a submission, with the junction's cumulative tokens.
pub async fn submission_out(state: &AppState, submission: &Submission) -> SubmissionOut {
  let book = state.grade_book.read().await;
  let key = (submission.user_id.clone(), submission.question_id.clone());
  let tokens_received = book.junctions.get(&key).map(|j| j.tokens_received).unwrap_or(0.0);
  let test_summary = match &submission.kind {
    SubmissionKind::Code { .. } => Some(report::test_summary(submission.judge_results())),
    SubmissionKind::MultipleChoice => None,
  };
  SubmissionOut {
    id: submission.id.clone(),
    question_id: submission.question_id.clone(),
    status: submission.status(),
    grade: submission.grade,
    is_correct: submission.is_correct,
    is_partially_correct: submission.is_partially_correct,
    finalized: submission.finalized,
    test_summary,
    tokens_received,
  }
}

#[cfg(test)]
mod tests {
  use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
  use chrono::Utc;

  use super::*;
  use crate::config::AppConfig;
  use crate::domain::{
    Category, Difficulty, Event, EventKind, JudgeStatus, Role, TokenValue, User,
  };

  async fn test_state() -> AppState {
    let state = AppState::with_config(AppConfig::default());
    state.users.write().await.insert(
      "u1".into(),
      User { id: "u1".into(), name: "Sam".into(), role: Role::Learner },
    );
    state.categories.write().await.insert(
      "basics".into(),
      Category {
        id: "basics".into(),
        name: "Basics".into(),
        description: String::new(),
        parent: None,
        next_categories: vec![],
      },
    );
    let tv = TokenValue::new("basics".into(), Difficulty::Normal, None);
    state.token_values.write().await.insert((tv.category.clone(), tv.difficulty), tv.value);
    state.events.write().await.insert(
      "practice".into(),
      Event { id: "practice".into(), name: "Practice".into(), kind: EventKind::Assignment, open: true },
    );
    state.events.write().await.insert(
      "midterm".into(),
      Event { id: "midterm".into(), name: "Midterm".into(), kind: EventKind::Exam, open: true },
    );
    state
  }

  fn question(id: &str, kind: QuestionKind, answer: Option<&str>, event: &str, category: Option<&str>) -> Question {
    Question {
      id: id.into(),
      title: "Loops".into(),
      text: "Pick one.".into(),
      answer: answer.map(str::to_string),
      tutorial: None,
      max_submissions: 10,
      author: None,
      category: category.map(str::to_string),
      difficulty: Difficulty::Normal,
      is_verified: true,
      event: Some(event.into()),
      variables: vec![],
      kind,
      created_at: Utc::now(),
      modified_at: Utc::now(),
    }
  }

  fn mc_question(id: &str, event: &str) -> Question {
    question(
      id,
      QuestionKind::MultipleChoice { choices: vec![], visible_distractors: 2 },
      Some("B"),
      event,
      Some("basics"),
    )
  }

  fn code_question(id: &str, event: &str) -> Question {
    question(
      id,
      QuestionKind::Code { harness_template: "{answer}".into(), input_files: vec![] },
      None,
      event,
      Some("basics"),
    )
  }

  async fn insert_question(state: &AppState, q: Question) {
    state.questions.write().await.insert(q.id.clone(), q);
  }

  fn judge_entry(status_id: i32, stdout: Option<&str>) -> TestCaseResult {
    TestCaseResult {
      status: JudgeStatus { id: status_id, description: String::new() },
      token: Some("t".into()),
      stdout: stdout.map(|s| B64.encode(s)),
      stderr: None,
    }
  }

  fn report_xml(passed: usize, failed: usize) -> String {
    let mut xml = String::new();
    for i in 0..passed {
      xml.push_str(&format!(r#"<testcase name="p{}"/>"#, i));
    }
    for i in 0..failed {
      xml.push_str(&format!(r#"<testcase name="f{}"><failure/></testcase>"#, i));
    }
    xml
  }

  #[tokio::test]
  async fn correct_choice_settles_and_credits() {
    let state = test_state().await;
    insert_question(&state, mc_question("q1", "practice")).await;

    let sub = create_submission(&state, "u1", "q1", "B".into(), vec![]).await.expect("submit");
    assert!(sub.finalized);
    assert!(sub.is_correct);
    assert_eq!(sub.grade, 1.0);

    let book = state.grade_book.read().await;
    let j = &book.junctions[&("u1".to_string(), "q1".to_string())];
    assert!(j.is_solved);
    assert_eq!(j.tokens_received, 2.0);
    assert_eq!(book.actions.len(), 1);
    assert_eq!(book.actions[0].token_change, 2.0);
  }

  #[tokio::test]
  async fn wrong_choice_settles_without_credit() {
    let state = test_state().await;
    insert_question(&state, mc_question("q1", "practice")).await;

    let sub = create_submission(&state, "u1", "q1", "C".into(), vec![]).await.expect("submit");
    assert!(sub.finalized);
    assert!(!sub.is_correct && !sub.is_partially_correct);
    assert_eq!(sub.status(), "Wrong");

    let book = state.grade_book.read().await;
    let j = &book.junctions[&("u1".to_string(), "q1".to_string())];
    assert!(!j.is_solved && !j.is_partially_solved);
    assert_eq!(j.tokens_received, 0.0);
    assert!(book.actions.is_empty());
  }

  #[tokio::test]
  async fn refreshing_a_finalized_submission_changes_nothing() {
    let state = test_state().await;
    insert_question(&state, mc_question("q1", "practice")).await;
    let sub = create_submission(&state, "u1", "q1", "B".into(), vec![]).await.expect("submit");

    for _ in 0..3 {
      let again = refresh_submission(&state, &sub.id).await.expect("refresh");
      assert_eq!(again.grade, sub.grade);
      assert_eq!(again.is_correct, sub.is_correct);
      assert!(again.finalized);
    }
    let book = state.grade_book.read().await;
    assert_eq!(book.actions.len(), 1);
  }

  #[tokio::test]
  async fn solved_junction_blocks_further_submissions() {
    let state = test_state().await;
    insert_question(&state, mc_question("q1", "practice")).await;
    create_submission(&state, "u1", "q1", "B".into(), vec![]).await.expect("submit");

    let denied = create_submission(&state, "u1", "q1", "B".into(), vec![]).await;
    assert!(matches!(denied, Err(CoreError::NotAllowed(_))));
  }

  #[tokio::test]
  async fn quota_exhaustion_blocks_submission() {
    let state = test_state().await;
    let mut q = mc_question("q1", "practice");
    q.max_submissions = 1;
    insert_question(&state, q).await;

    create_submission(&state, "u1", "q1", "C".into(), vec![]).await.expect("first attempt");
    let denied = create_submission(&state, "u1", "q1", "B".into(), vec![]).await;
    assert!(matches!(denied, Err(CoreError::NotAllowed(_))));
  }

  #[tokio::test]
  async fn undispatched_code_submission_stays_evaluating() {
    let state = test_state().await;
    insert_question(&state, code_question("q1", "practice")).await;

    // No judge is configured in tests, so dispatch is skipped entirely.
    let sub = create_submission(&state, "u1", "q1", "class A {}".into(), vec![]).await.expect("submit");
    assert!(!sub.finalized);
    assert!(sub.in_progress());
    assert_eq!(sub.status(), "Evaluating");

    let again = refresh_submission(&state, &sub.id).await.expect("refresh");
    assert!(!again.finalized);
    let book = state.grade_book.read().await;
    assert!(book.actions.is_empty());
  }

  #[tokio::test]
  async fn running_entries_keep_submission_in_progress() {
    let state = test_state().await;
    insert_question(&state, code_question("q1", "practice")).await;
    let sub = create_submission(&state, "u1", "q1", "class A {}".into(), vec![]).await.expect("submit");

    let updated = ingest_judge_results(
      &state,
      &sub.id,
      vec![judge_entry(JudgeStatus::PROCESSING, None), judge_entry(JudgeStatus::PROCESSING, None)],
    )
    .await
    .expect("ingest");
    assert!(!updated.finalized);
    assert_eq!(updated.status(), "Evaluating");
  }

  #[tokio::test]
  async fn compile_error_settles_at_zero_without_credit() {
    let state = test_state().await;
    insert_question(&state, code_question("q1", "practice")).await;
    let sub = create_submission(&state, "u1", "q1", "class A {".into(), vec![]).await.expect("submit");

    let updated = ingest_judge_results(
      &state,
      &sub.id,
      vec![
        judge_entry(JudgeStatus::COMPILATION_ERROR, None),
        judge_entry(JudgeStatus::COMPILATION_ERROR, None),
      ],
    )
    .await
    .expect("ingest");
    assert!(updated.finalized);
    assert_eq!(updated.grade, 0.0);
    assert!(!updated.is_correct);

    let book = state.grade_book.read().await;
    assert!(book.actions.is_empty());
    assert_eq!(book.junctions[&("u1".to_string(), "q1".to_string())].tokens_received, 0.0);
  }

  #[tokio::test]
  async fn passing_report_settles_and_credits_once() {
    let state = test_state().await;
    insert_question(&state, code_question("q1", "practice")).await;
    let sub = create_submission(&state, "u1", "q1", "class A {}".into(), vec![]).await.expect("submit");

    let xml = report_xml(2, 0);
    let updated = ingest_judge_results(
      &state,
      &sub.id,
      vec![judge_entry(JudgeStatus::ACCEPTED, Some(&xml))],
    )
    .await
    .expect("ingest");
    assert!(updated.finalized);
    assert!(updated.is_correct);
    assert_eq!(updated.grade, 1.0);

    // A late duplicate callback must not double-credit.
    let again = ingest_judge_results(
      &state,
      &sub.id,
      vec![judge_entry(JudgeStatus::ACCEPTED, Some(&xml))],
    )
    .await
    .expect("ingest again");
    assert!(again.finalized);

    let book = state.grade_book.read().await;
    assert_eq!(book.actions.len(), 1);
    assert_eq!(book.junctions[&("u1".to_string(), "q1".to_string())].tokens_received, 2.0);
  }

  #[tokio::test]
  async fn exam_regrade_overwrites_tokens_downward() {
    let state = test_state().await;
    insert_question(&state, code_question("q1", "midterm")).await;

    let first = create_submission(&state, "u1", "q1", "v1".into(), vec![]).await.expect("submit");
    let xml = report_xml(9, 1);
    ingest_judge_results(&state, &first.id, vec![judge_entry(JudgeStatus::ACCEPTED, Some(&xml))])
      .await
      .expect("ingest");
    {
      let book = state.grade_book.read().await;
      let j = &book.junctions[&("u1".to_string(), "q1".to_string())];
      assert!((j.tokens_received - 0.9 * 2.0).abs() < 1e-9);
    }

    let second = create_submission(&state, "u1", "q1", "v2".into(), vec![]).await.expect("submit");
    let xml = report_xml(5, 5);
    ingest_judge_results(&state, &second.id, vec![judge_entry(JudgeStatus::ACCEPTED, Some(&xml))])
      .await
      .expect("ingest");

    let book = state.grade_book.read().await;
    let j = &book.junctions[&("u1".to_string(), "q1".to_string())];
    assert!((j.tokens_received - 0.5 * 2.0).abs() < 1e-9);
    assert_eq!(book.actions.len(), 2);
  }

  #[tokio::test]
  async fn missing_token_value_blocks_finalization_until_configured() {
    let state = test_state().await;
    let mut q = mc_question("q1", "practice");
    q.category = Some("unconfigured".into());
    insert_question(&state, q).await;

    let denied = create_submission(&state, "u1", "q1", "B".into(), vec![]).await;
    assert!(matches!(denied, Err(CoreError::MissingTokenValue { .. })));

    // The submission was stored un-finalized; fixing the configuration and
    // re-running the settle pass credits it.
    let id = {
      let book = state.grade_book.read().await;
      let sub = book.submissions.values().next().expect("stored submission");
      assert!(!sub.finalized);
      sub.id.clone()
    };
    state
      .token_values
      .write()
      .await
      .insert(("unconfigured".into(), Difficulty::Normal), 4.0);

    let settled = refresh_submission(&state, &id).await.expect("refresh");
    assert!(settled.finalized);
    let book = state.grade_book.read().await;
    assert_eq!(book.junctions[&("u1".to_string(), "q1".to_string())].tokens_received, 4.0);
    assert_eq!(book.actions.len(), 1);
  }

  #[tokio::test]
  async fn question_view_is_stable_per_junction_seed() {
    let state = test_state().await;
    let mut q = mc_question("q1", "practice");
    q.text = "What is {n}?".into();
    q.variables = vec![crate::variables::VariableSpec::Int { name: "n".into(), min: 1, max: 1_000_000 }];
    q.kind = QuestionKind::MultipleChoice {
      choices: vec![
        crate::domain::Choice { key: "a".into(), text: "{n}".into() },
        crate::domain::Choice { key: "b".into(), text: "0".into() },
        crate::domain::Choice { key: "c".into(), text: "1".into() },
        crate::domain::Choice { key: "d".into(), text: "2".into() },
      ],
      visible_distractors: 2,
    };
    insert_question(&state, q).await;

    let first = question_view(&state, "u1", "q1").await.expect("view");
    let second = question_view(&state, "u1", "q1").await.expect("view");
    assert_eq!(first.text, second.text);
    let keys: Vec<_> = first.choices.iter().map(|c| c.key.clone()).collect();
    let again: Vec<_> = second.choices.iter().map(|c| c.key.clone()).collect();
    assert_eq!(keys, again);
    assert_eq!(first.choices.len(), 3);
    assert!(first.variable_errors.is_empty());
    assert!(!first.text.contains("{n}"));
    assert!(first.can_submit);
  }
}
