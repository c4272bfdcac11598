//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Choice, Difficulty, SourceFile, TestCaseResult};

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// Category listing entry, with progression successors.
#[derive(Serialize)]
pub struct CategoryOut {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parent: Option<String>,
    #[serde(rename = "numQuestions")]
    pub num_questions: usize,
    #[serde(rename = "nextCategories")]
    pub next_categories: Vec<String>,
}

#[derive(Serialize)]
pub struct QuestionSummaryOut {
    pub id: String,
    pub title: String,
    #[serde(rename = "questionType")]
    pub question_type: &'static str,
    pub difficulty: Difficulty,
    pub category: Option<String>,
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
    pub event: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionViewQuery {
    #[serde(rename = "questionId")]
    pub question_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Per-user rendered question: variables substituted, visible choices in
/// the junction's stable shuffled order, generation diagnostics attached.
#[derive(Serialize)]
pub struct QuestionView {
    pub id: String,
    pub title: String,
    pub text: String,
    #[serde(rename = "questionType")]
    pub question_type: &'static str,
    pub difficulty: Difficulty,
    pub category: Option<String>,
    pub choices: Vec<Choice>,
    #[serde(rename = "variableErrors")]
    pub variable_errors: Vec<String>,
    /// Tutorial body, present only once the learner opened it.
    pub tutorial: Option<String>,
    pub status: &'static str,
    #[serde(rename = "attemptsUsed")]
    pub attempts_used: String,
    #[serde(rename = "tokensReceived")]
    pub tokens_received: f64,
    #[serde(rename = "tokenValue")]
    pub token_value: Option<f64>,
    #[serde(rename = "canSubmit")]
    pub can_submit: bool,
}

#[derive(Deserialize)]
pub struct TutorialIn {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "questionId")]
    pub question_id: String,
}

#[derive(Serialize)]
pub struct TutorialOut {
    #[serde(rename = "openedTutorial")]
    pub opened_tutorial: bool,
}

#[derive(Deserialize)]
pub struct SubmissionIn {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub answer: String,
    #[serde(default)]
    pub files: Vec<SourceFile>,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionQuery {
    #[serde(rename = "submissionId")]
    pub submission_id: String,
}

#[derive(Serialize)]
pub struct SubmissionOut {
    pub id: String,
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub status: &'static str,
    pub grade: f64,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
    #[serde(rename = "isPartiallyCorrect")]
    pub is_partially_correct: bool,
    pub finalized: bool,
    /// "passed/total" line for code submissions.
    #[serde(rename = "testSummary")]
    pub test_summary: Option<String>,
    #[serde(rename = "tokensReceived")]
    pub tokens_received: f64,
}

/// Result batch pushed back by the judge deployment.
#[derive(Deserialize)]
pub struct JudgeCallbackIn {
    #[serde(rename = "submissionId")]
    pub submission_id: String,
    pub results: Vec<TestCaseResult>,
}

#[derive(Debug, Deserialize)]
pub struct ActionsQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
}
