//! Domain models: categories, token values, events, users, questions,
//! junctions, submissions, and the raw judge-result payload.
//!
//! Polymorphic entities (questions, submissions) are closed tagged-variant
//! sets; fields shared by every variant live on the base struct. Derived
//! junction flags (`is_solved` / `is_partially_solved`) are owned by the
//! aggregator here and never set directly by callers.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::variables::VariableSpec;

/// Question difficulty. The wire spelling ("EASY"/"NORMAL"/"HARD") is part of
/// the stored-data contract and must not drift.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
  Easy,
  Normal,
  Hard,
}

impl Difficulty {
  /// Default reward multiplier applied when an administrator creates a token
  /// value without an explicit amount.
  pub fn default_token_value(self) -> f64 {
    match self {
      Difficulty::Easy => 1.0,
      Difficulty::Normal => 2.0,
      Difficulty::Hard => 3.0,
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Difficulty::Easy => write!(f, "EASY"),
      Difficulty::Normal => write!(f, "NORMAL"),
      Difficulty::Hard => write!(f, "HARD"),
    }
  }
}

/// A node in the category tree. `parent` forms a tree, `next_categories` a
/// DAG of suggested follow-up categories. Cycles through `parent` are
/// disallowed by convention only; nothing here walks the chain transitively.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub parent: Option<String>,
  #[serde(default)]
  pub next_categories: Vec<String>,
}

/// Reward multiplier keyed by (category, difficulty).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenValue {
  pub category: String,
  pub difficulty: Difficulty,
  pub value: f64,
}

impl TokenValue {
  /// Construction-time default policy: when no amount is given, fall back to
  /// the per-difficulty default. This runs before the entity is considered
  /// valid, never inside a persistence hook.
  pub fn new(category: String, difficulty: Difficulty, value: Option<f64>) -> Self {
    let value = value.unwrap_or_else(|| difficulty.default_token_value());
    Self { category, difficulty, value }
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  Assignment,
  Exam,
}

/// A course event a question may be bound to. Supplies the `is_open` and
/// `is_exam` predicates the grading core consumes; how `open` is toggled is
/// an administrative concern outside this crate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
  pub id: String,
  pub name: String,
  pub kind: EventKind,
  #[serde(default)]
  pub open: bool,
}

impl Event {
  pub fn is_exam(&self) -> bool {
    self.kind == EventKind::Exam
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Learner,
  Instructor,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
  pub id: String,
  pub name: String,
  pub role: Role,
}

impl User {
  /// Instructors bypass submission-eligibility checks entirely.
  pub fn is_instructor(&self) -> bool {
    self.role == Role::Instructor
  }
}

/// One answer option of a multiple-choice question. Stored order is the
/// insertion order and drives which distractors are visible.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Choice {
  pub key: String,
  pub text: String,
}

/// A named input file shipped to the judge alongside a code submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputFile {
  pub name: String,
  #[serde(default)]
  pub content: String,
}

/// A source file attached to a code answer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceFile {
  pub name: String,
  pub content: String,
}

/// Closed variant set of question kinds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
  MultipleChoice {
    choices: Vec<Choice>,
    visible_distractors: usize,
  },
  /// Same payload as multiple choice, but the answer is a key *set* and is
  /// compared order-insensitively.
  Checkbox {
    choices: Vec<Choice>,
    visible_distractors: usize,
  },
  Code {
    harness_template: String,
    #[serde(default)]
    input_files: Vec<InputFile>,
  },
}

impl QuestionKind {
  pub fn type_name(&self) -> &'static str {
    match self {
      QuestionKind::MultipleChoice { .. } => "multiple choice question",
      QuestionKind::Checkbox { .. } => "checkbox question",
      QuestionKind::Code { .. } => "code question",
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  pub title: String,
  /// Rich-text body; may reference generated variables as `{name}`.
  pub text: String,
  /// Stored answer key: the correct choice key (or comma-joined key set for
  /// checkbox questions). Code questions leave this unset.
  #[serde(default)]
  pub answer: Option<String>,
  #[serde(default)]
  pub tutorial: Option<String>,
  pub max_submissions: u32,
  #[serde(default)]
  pub author: Option<String>,
  #[serde(default)]
  pub category: Option<String>,
  pub difficulty: Difficulty,
  #[serde(default)]
  pub is_verified: bool,
  #[serde(default)]
  pub event: Option<String>,
  /// Variable specification shared by all variants; empty for
  /// non-parameterized questions.
  #[serde(default)]
  pub variables: Vec<VariableSpec>,
  pub kind: QuestionKind,
  pub created_at: DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
}

/// Construction-time quota policy: exam-bound questions default to 10
/// attempts, everything else to 100.
pub fn default_submission_quota(event: Option<&Event>) -> u32 {
  match event {
    Some(e) if e.is_exam() => 10,
    _ => 100,
  }
}

impl Question {
  /// Open means bound to an event that is currently accepting submissions.
  pub fn is_open(&self, event: Option<&Event>) -> bool {
    matches!(event, Some(e) if e.open)
  }

  pub fn is_exam(&self, event: Option<&Event>) -> bool {
    matches!(event, Some(e) if e.is_exam())
  }
}

/// Judge status taxonomy, preserved bit-for-bit from the judge deployment:
/// numeric ids with a human description. 1 and 2 are the in-progress states.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct JudgeStatus {
  pub id: i32,
  #[serde(default)]
  pub description: String,
}

impl JudgeStatus {
  pub const IN_QUEUE: i32 = 1;
  pub const PROCESSING: i32 = 2;
  pub const ACCEPTED: i32 = 3;
  pub const WRONG_ANSWER: i32 = 4;
  pub const TIME_LIMIT_EXCEEDED: i32 = 5;
  pub const COMPILATION_ERROR: i32 = 6;

  pub fn queued() -> Self {
    Self { id: Self::IN_QUEUE, description: "In Queue".into() }
  }

  pub fn is_in_progress(&self) -> bool {
    self.id == Self::IN_QUEUE || self.id == Self::PROCESSING
  }

  pub fn is_compile_error(&self) -> bool {
    self.id == Self::COMPILATION_ERROR
  }
}

/// One per-test-case entry returned by the judge. `stdout`/`stderr` are
/// base64-encoded captures; `token` identifies the entry for result polling.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestCaseResult {
  pub status: JudgeStatus,
  #[serde(default)]
  pub token: Option<String>,
  #[serde(default)]
  pub stdout: Option<String>,
  #[serde(default)]
  pub stderr: Option<String>,
}

/// Assign the per-junction seed: an 8-digit integer drawn once at creation.
pub fn random_seed() -> u64 {
  rand::thread_rng().gen_range(0..100_000_000)
}

/// Per-(user, question) record: interaction history, the immutable random
/// seed, cumulative tokens, and the derived solved flags.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Junction {
  pub user_id: String,
  pub question_id: String,
  pub seed: u64,
  #[serde(default)]
  pub last_viewed: Option<DateTime<Utc>>,
  #[serde(default)]
  pub opened_tutorial: bool,
  #[serde(default)]
  pub tokens_received: f64,
  #[serde(default)]
  pub is_solved: bool,
  #[serde(default)]
  pub is_partially_solved: bool,
}

impl Junction {
  pub fn new(user_id: String, question_id: String) -> Self {
    Self {
      user_id,
      question_id,
      seed: random_seed(),
      last_viewed: None,
      opened_tutorial: false,
      tokens_received: 0.0,
      is_solved: false,
      is_partially_solved: false,
    }
  }

  /// Aggregator: recompute the derived flags from the full submission
  /// history. The only writer of `is_solved` / `is_partially_solved`.
  pub fn recompute<'a>(&mut self, history: impl Iterator<Item = &'a Submission>) {
    let mut any_correct = false;
    let mut any_partial = false;
    for s in history {
      any_correct |= s.is_correct;
      any_partial |= s.is_partially_correct;
    }
    self.is_solved = any_correct;
    self.is_partially_solved = !any_correct && any_partial;
  }

  /// Submission-quota eligibility. Instructors bypass every check; opening
  /// the tutorial or solving the question closes the junction; otherwise the
  /// quota and the event's open state decide.
  pub fn can_submit(
    &self,
    user: &User,
    question: &Question,
    event: Option<&Event>,
    attempts: usize,
  ) -> bool {
    if user.is_instructor() {
      return true;
    }
    if self.opened_tutorial {
      return false;
    }
    if self.is_solved {
      return false;
    }
    attempts < question.max_submissions as usize && question.is_open(event)
  }

  /// Status word shown in question listings.
  pub fn status(&self, attempts: usize) -> &'static str {
    if self.is_solved {
      return "Solved";
    }
    if self.is_partially_solved {
      return "Partially Solved";
    }
    if attempts > 0 {
      return "Wrong";
    }
    if self.last_viewed.is_some() {
      return "Unsolved";
    }
    "New"
  }
}

/// Closed variant set of submission kinds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmissionKind {
  MultipleChoice,
  Code {
    /// Judge entry tokens, in dispatch order. Empty until dispatch succeeds.
    #[serde(default)]
    judge_tokens: Vec<String>,
    /// Raw per-test-case results as delivered by the judge. Owned
    /// exclusively by this submission.
    #[serde(default)]
    results: Vec<TestCaseResult>,
    #[serde(default)]
    files: Vec<SourceFile>,
  },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
  pub id: String,
  pub user_id: String,
  pub question_id: String,
  pub submitted_at: DateTime<Utc>,
  pub answer: String,
  #[serde(default)]
  pub grade: f64,
  #[serde(default)]
  pub is_correct: bool,
  #[serde(default)]
  pub is_partially_correct: bool,
  /// Once set, the grading fields above are immutable.
  #[serde(default)]
  pub finalized: bool,
  pub kind: SubmissionKind,
}

impl Submission {
  pub fn new(user_id: String, question_id: String, answer: String, kind: SubmissionKind) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      user_id,
      question_id,
      submitted_at: Utc::now(),
      answer,
      grade: 0.0,
      is_correct: false,
      is_partially_correct: false,
      finalized: false,
      kind,
    }
  }

  pub fn judge_results(&self) -> &[TestCaseResult] {
    match &self.kind {
      SubmissionKind::Code { results, .. } => results,
      _ => &[],
    }
  }

  /// In-progress while any judge entry is queued or running. A code
  /// submission with no entries at all is also in progress: dispatch has not
  /// happened (or failed) and the caller may retry it, so it must not settle
  /// at zero.
  pub fn in_progress(&self) -> bool {
    match &self.kind {
      SubmissionKind::MultipleChoice => false,
      SubmissionKind::Code { results, .. } => {
        results.is_empty() || results.iter().any(|r| r.status.is_in_progress())
      }
    }
  }

  /// Compile failure short-circuits test counting: every entry reports the
  /// compile-error status. Only meaningful once settled.
  pub fn is_compile_error(&self) -> bool {
    let results = self.judge_results();
    !results.is_empty() && results.iter().all(|r| r.status.is_compile_error())
  }

  /// Status word shown next to a submission.
  pub fn status(&self) -> &'static str {
    if self.in_progress() {
      return "Evaluating";
    }
    if self.is_correct {
      return "Correct";
    }
    if self.is_partially_correct {
      return "Partially Correct";
    }
    "Wrong"
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn question(event: Option<&Event>) -> Question {
    Question {
      id: "q1".into(),
      title: "Loops".into(),
      text: "How many iterations?".into(),
      answer: Some("a".into()),
      tutorial: None,
      max_submissions: default_submission_quota(event),
      author: None,
      category: Some("basics".into()),
      difficulty: Difficulty::Easy,
      is_verified: true,
      event: event.map(|e| e.id.clone()),
      variables: vec![],
      kind: QuestionKind::MultipleChoice {
        choices: vec![],
        visible_distractors: 2,
      },
      created_at: Utc::now(),
      modified_at: Utc::now(),
    }
  }

  fn learner() -> User {
    User { id: "u1".into(), name: "Sam".into(), role: Role::Learner }
  }

  fn open_event(kind: EventKind) -> Event {
    Event { id: "e1".into(), name: "Week 1".into(), kind, open: true }
  }

  #[test]
  fn quota_defaults_depend_on_event_kind() {
    let exam = open_event(EventKind::Exam);
    let assignment = open_event(EventKind::Assignment);
    assert_eq!(default_submission_quota(Some(&exam)), 10);
    assert_eq!(default_submission_quota(Some(&assignment)), 100);
    assert_eq!(default_submission_quota(None), 100);
  }

  #[test]
  fn token_value_defaults_by_difficulty() {
    assert_eq!(TokenValue::new("c".into(), Difficulty::Easy, None).value, 1.0);
    assert_eq!(TokenValue::new("c".into(), Difficulty::Normal, None).value, 2.0);
    assert_eq!(TokenValue::new("c".into(), Difficulty::Hard, None).value, 3.0);
    assert_eq!(TokenValue::new("c".into(), Difficulty::Hard, Some(7.5)).value, 7.5);
  }

  #[test]
  fn recompute_prefers_solved_over_partial() {
    let mut j = Junction::new("u1".into(), "q1".into());
    let mut a = Submission::new("u1".into(), "q1".into(), "x".into(), SubmissionKind::MultipleChoice);
    a.is_partially_correct = true;
    let mut b = a.clone();
    b.is_partially_correct = false;
    b.is_correct = true;

    j.recompute([&a].into_iter());
    assert!(!j.is_solved && j.is_partially_solved);

    j.recompute([&a, &b].into_iter());
    assert!(j.is_solved && !j.is_partially_solved);
  }

  #[test]
  fn quota_exhaustion_blocks_submission() {
    let event = open_event(EventKind::Exam);
    let q = question(Some(&event));
    let j = Junction::new("u1".into(), "q1".into());
    assert!(j.can_submit(&learner(), &q, Some(&event), 9));
    assert!(!j.can_submit(&learner(), &q, Some(&event), 10));
  }

  #[test]
  fn solved_or_tutorial_blocks_learners_but_not_instructors() {
    let event = open_event(EventKind::Assignment);
    let q = question(Some(&event));
    let instructor = User { id: "t1".into(), name: "Kim".into(), role: Role::Instructor };

    let mut j = Junction::new("u1".into(), "q1".into());
    j.is_solved = true;
    assert!(!j.can_submit(&learner(), &q, Some(&event), 0));
    assert!(j.can_submit(&instructor, &q, Some(&event), 0));

    let mut j = Junction::new("u1".into(), "q1".into());
    j.opened_tutorial = true;
    assert!(!j.can_submit(&learner(), &q, Some(&event), 0));
  }

  #[test]
  fn closed_or_unbound_question_blocks_submission() {
    let mut event = open_event(EventKind::Assignment);
    let q = question(Some(&event));
    event.open = false;
    assert!(!q.is_open(Some(&event)));
    let j = Junction::new("u1".into(), "q1".into());
    assert!(!j.can_submit(&learner(), &q, Some(&event), 0));
    assert!(!j.can_submit(&learner(), &q, None, 0));
  }

  #[test]
  fn code_submission_without_entries_is_in_progress() {
    let s = Submission::new(
      "u1".into(),
      "q1".into(),
      "class A {}".into(),
      SubmissionKind::Code { judge_tokens: vec![], results: vec![], files: vec![] },
    );
    assert!(s.in_progress());
    assert_eq!(s.status(), "Evaluating");
  }
}
