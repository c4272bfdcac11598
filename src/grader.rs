//! Grading strategies, polymorphic over the question kind.
//!
//! `MultipleChoiceGrader` settles synchronously from the stored answer key.
//! `CodeJudgeGrader` scores whatever judge results are currently attached to
//! the submission; the pipeline re-invokes it on every write until the
//! submission settles. Dispatching to the judge itself lives on
//! `judge::JudgeClient`.

use std::collections::BTreeSet;

use crate::domain::{Question, QuestionKind, Submission};
use crate::report;
use crate::util::clamp_unit;

/// A grading strategy: score a submission into `(correct, score in [0,1])`.
pub trait Grader {
  fn grade(&self, submission: &Submission, question: &Question) -> (bool, f64);
}

pub struct MultipleChoiceGrader;
pub struct CodeJudgeGrader;

/// Strategy dispatch by question variant tag.
pub fn grader_for(kind: &QuestionKind) -> &'static dyn Grader {
  match kind {
    QuestionKind::MultipleChoice { .. } | QuestionKind::Checkbox { .. } => &MultipleChoiceGrader,
    QuestionKind::Code { .. } => &CodeJudgeGrader,
  }
}

impl Grader for MultipleChoiceGrader {
  /// Exact answer-key match, no partial credit. Checkbox answers are key
  /// sets, compared order-insensitively.
  fn grade(&self, submission: &Submission, question: &Question) -> (bool, f64) {
    let Some(expected) = question.answer.as_deref() else {
      return (false, 0.0);
    };
    let correct = match &question.kind {
      QuestionKind::Checkbox { .. } => key_set(&submission.answer) == key_set(expected),
      _ => submission.answer == expected,
    };
    (correct, if correct { 1.0 } else { 0.0 })
  }
}

fn key_set(answer: &str) -> BTreeSet<&str> {
  answer.split(',').map(str::trim).filter(|k| !k.is_empty()).collect()
}

impl Grader for CodeJudgeGrader {
  /// Count PASS entries of the decoded test report. A compile failure across
  /// every judge entry short-circuits to zero regardless of report content;
  /// an empty or malformed report counts as zero passing tests.
  fn grade(&self, submission: &Submission, _question: &Question) -> (bool, f64) {
    if submission.is_compile_error() {
      return (false, 0.0);
    }
    let report = report::decoded_report(submission.judge_results());
    let total = report.len();
    if total == 0 {
      return (false, 0.0);
    }
    let passed = report::passed_count(&report);
    (passed == total, clamp_unit(passed as f64 / total as f64))
  }
}

#[cfg(test)]
mod tests {
  use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
  use chrono::Utc;

  use super::*;
  use crate::domain::{
    Difficulty, JudgeStatus, SubmissionKind, TestCaseResult,
  };

  fn question(kind: QuestionKind, answer: Option<&str>) -> Question {
    Question {
      id: "q1".into(),
      title: "Sorting".into(),
      text: "Pick one.".into(),
      answer: answer.map(str::to_string),
      tutorial: None,
      max_submissions: 100,
      author: None,
      category: Some("basics".into()),
      difficulty: Difficulty::Normal,
      is_verified: true,
      event: None,
      variables: vec![],
      kind,
      created_at: Utc::now(),
      modified_at: Utc::now(),
    }
  }

  fn mc_question(answer: &str) -> Question {
    question(
      QuestionKind::MultipleChoice { choices: vec![], visible_distractors: 2 },
      Some(answer),
    )
  }

  fn submission(answer: &str, kind: SubmissionKind) -> Submission {
    Submission::new("u1".into(), "q1".into(), answer.into(), kind)
  }

  fn judge_entry(status_id: i32, stdout: Option<String>) -> TestCaseResult {
    TestCaseResult {
      status: JudgeStatus { id: status_id, description: String::new() },
      token: Some("t".into()),
      stdout,
      stderr: None,
    }
  }

  fn code_submission(results: Vec<TestCaseResult>) -> Submission {
    submission(
      "class A {}",
      SubmissionKind::Code { judge_tokens: vec![], results, files: vec![] },
    )
  }

  const TWO_OF_THREE: &str = concat!(
    r#"<testcase name="a"/>"#,
    r#"<testcase name="b"><failure message="boom"/></testcase>"#,
    r#"<testcase name="c"/>"#,
  );

  #[test]
  fn matching_choice_key_scores_full() {
    let q = mc_question("B");
    let s = submission("B", SubmissionKind::MultipleChoice);
    assert_eq!(grader_for(&q.kind).grade(&s, &q), (true, 1.0));
  }

  #[test]
  fn wrong_choice_key_scores_zero() {
    let q = mc_question("B");
    let s = submission("C", SubmissionKind::MultipleChoice);
    assert_eq!(grader_for(&q.kind).grade(&s, &q), (false, 0.0));
  }

  #[test]
  fn checkbox_compares_key_sets() {
    let q = question(
      QuestionKind::Checkbox { choices: vec![], visible_distractors: 3 },
      Some("a,c"),
    );
    let right = submission("c, a", SubmissionKind::MultipleChoice);
    let short = submission("a", SubmissionKind::MultipleChoice);
    assert_eq!(grader_for(&q.kind).grade(&right, &q), (true, 1.0));
    assert_eq!(grader_for(&q.kind).grade(&short, &q), (false, 0.0));
  }

  #[test]
  fn code_score_is_passed_over_total() {
    let q = question(
      QuestionKind::Code { harness_template: String::new(), input_files: vec![] },
      None,
    );
    let s = code_submission(vec![judge_entry(
      JudgeStatus::ACCEPTED,
      Some(B64.encode(TWO_OF_THREE)),
    )]);
    let (correct, score) = grader_for(&q.kind).grade(&s, &q);
    assert!(!correct);
    assert!((score - 2.0 / 3.0).abs() < 1e-9);
  }

  #[test]
  fn all_tests_passing_is_correct() {
    let q = question(
      QuestionKind::Code { harness_template: String::new(), input_files: vec![] },
      None,
    );
    let report = r#"<testcase name="a"/><testcase name="b"/>"#;
    let s = code_submission(vec![judge_entry(JudgeStatus::ACCEPTED, Some(B64.encode(report)))]);
    assert_eq!(grader_for(&q.kind).grade(&s, &q), (true, 1.0));
  }

  #[test]
  fn compile_error_short_circuits_report_content() {
    let q = question(
      QuestionKind::Code { harness_template: String::new(), input_files: vec![] },
      None,
    );
    // Even a passing-looking report is ignored when every entry failed to
    // compile.
    let report = r#"<testcase name="a"/>"#;
    let s = code_submission(vec![
      judge_entry(JudgeStatus::COMPILATION_ERROR, Some(B64.encode(report))),
      judge_entry(JudgeStatus::COMPILATION_ERROR, None),
    ]);
    assert_eq!(grader_for(&q.kind).grade(&s, &q), (false, 0.0));
    assert!(!s.in_progress());
  }

  #[test]
  fn malformed_report_scores_zero() {
    let q = question(
      QuestionKind::Code { harness_template: String::new(), input_files: vec![] },
      None,
    );
    let s = code_submission(vec![judge_entry(JudgeStatus::ACCEPTED, Some(B64.encode("garbage")))]);
    assert_eq!(grader_for(&q.kind).grade(&s, &q), (false, 0.0));
  }
}
