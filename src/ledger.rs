//! Token reward ledger: credit policy and the audit actions it emits.
//!
//! Credit runs once per settlement (the pipeline guarantees that); this
//! module owns the policy itself. Outside exam mode tokens never decrease:
//! a learner's best score stands. Exam grading overwrites unconditionally so
//! a regrade after an answer-key fix can correct a score downward. Every
//! overwrite appends exactly one audit action for the activity feed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Junction, Question, Submission};

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
  Complete,
}

/// Immutable audit record consumed by timeline/activity feeds.
#[derive(Clone, Debug, Serialize)]
pub struct Action {
  pub id: String,
  pub actor: String,
  pub description: String,
  pub token_change: f64,
  pub kind: ActionKind,
  pub created_at: DateTime<Utc>,
}

impl Action {
  pub fn complete(actor: &str, description: String, token_change: f64) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      actor: actor.to_string(),
      description,
      token_change,
      kind: ActionKind::Complete,
      created_at: Utc::now(),
    }
  }
}

/// Apply the credit policy for one settled, qualifying submission.
///
/// `received = grade × token_value`; the junction's cumulative tokens are
/// overwritten unconditionally in exam mode and only on improvement
/// otherwise. Returns the audit action when the overwrite fired.
pub fn apply_credit(
  junction: &mut Junction,
  submission: &Submission,
  question: &Question,
  token_value: f64,
  is_exam: bool,
) -> Option<Action> {
  let received = submission.grade * token_value;
  let delta = received - junction.tokens_received;

  if is_exam || delta > 0.0 {
    junction.tokens_received = received;
    Some(Action::complete(
      &submission.user_id,
      describe_outcome(submission, question),
      received,
    ))
  } else {
    None
  }
}

fn describe_outcome(submission: &Submission, question: &Question) -> String {
  if submission.is_partially_correct {
    format!("Partially solved question '{}'", question.title)
  } else {
    format!("Solved question '{}'", question.title)
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::domain::{Difficulty, QuestionKind, SubmissionKind};

  fn question() -> Question {
    Question {
      id: "q1".into(),
      title: "Recursion".into(),
      text: String::new(),
      answer: Some("a".into()),
      tutorial: None,
      max_submissions: 100,
      author: None,
      category: Some("basics".into()),
      difficulty: Difficulty::Normal,
      is_verified: true,
      event: None,
      variables: vec![],
      kind: QuestionKind::MultipleChoice { choices: vec![], visible_distractors: 2 },
      created_at: Utc::now(),
      modified_at: Utc::now(),
    }
  }

  fn graded_submission(grade: f64, correct: bool) -> Submission {
    let mut s = Submission::new("u1".into(), "q1".into(), "a".into(), SubmissionKind::MultipleChoice);
    s.grade = grade;
    s.is_correct = correct;
    s.is_partially_correct = !correct && grade > 0.0;
    s
  }

  #[test]
  fn tokens_never_decrease_outside_exam_mode() {
    let mut junction = Junction::new("u1".into(), "q1".into());
    junction.tokens_received = 2.0;

    let worse = graded_submission(0.5, false);
    assert!(apply_credit(&mut junction, &worse, &question(), 2.0, false).is_none());
    assert_eq!(junction.tokens_received, 2.0);

    let better = graded_submission(1.0, true);
    let action = apply_credit(&mut junction, &better, &question(), 2.0, false)
      .expect("improvement should credit");
    assert_eq!(junction.tokens_received, 2.0 * 1.0);
    assert_eq!(action.token_change, 2.0);
    assert_eq!(action.kind, ActionKind::Complete);
    assert!(action.description.contains("Solved question 'Recursion'"));
  }

  #[test]
  fn exam_mode_overwrites_even_downward() {
    let mut junction = Junction::new("u1".into(), "q1".into());

    let first = graded_submission(0.9, false);
    apply_credit(&mut junction, &first, &question(), 2.0, true).expect("credit");
    assert!((junction.tokens_received - 1.8).abs() < 1e-9);

    let second = graded_submission(0.5, false);
    let action = apply_credit(&mut junction, &second, &question(), 2.0, true).expect("credit");
    assert!((junction.tokens_received - 1.0).abs() < 1e-9);
    assert!(action.description.contains("Partially solved"));
  }
}
