//! Client for the external code-execution judge.
//!
//! Dispatch is fire-and-forget: the batch call returns one queued entry per
//! test-case run, and results are fetched later by token (polling) or pushed
//! back through the callback route. The judge's wire shapes (numeric status
//! ids, base64-encoded captures) are an existing deployment's contract and
//! are passed through untouched.
//!
//! NOTE: We never log the auth token and keep payload log fields to lengths
//! and counts, not contents.

use std::collections::HashMap;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::JudgeCfg;
use crate::domain::{JudgeStatus, Question, QuestionKind, Submission, SubmissionKind, TestCaseResult};
use crate::error::JudgeError;
use crate::util::trunc_for_log;
use crate::variables::{render_text, VarValue};

const DEFAULT_LANGUAGE_ID: i32 = 62; // Java (OpenJDK)

#[derive(Clone)]
pub struct JudgeClient {
  pub client: reqwest::Client,
  pub base_url: String,
  auth_token: Option<String>,
  pub language_id: i32,
}

#[derive(Serialize)]
struct JudgeEntryReq {
  language_id: i32,
  /// base64-encoded rendered harness source
  source_code: String,
  /// base64-encoded input-file content for this run
  #[serde(skip_serializing_if = "Option::is_none")]
  stdin: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  additional_files: Vec<JudgeFileReq>,
}

#[derive(Clone, Serialize)]
struct JudgeFileReq {
  name: String,
  content: String,
}

#[derive(Serialize)]
struct BatchReq {
  submissions: Vec<JudgeEntryReq>,
}

#[derive(Deserialize)]
struct CreatedEntry {
  token: String,
}

#[derive(Deserialize)]
struct BatchResults {
  submissions: Vec<TestCaseResult>,
}

impl JudgeClient {
  /// Construct the client if we find JUDGE_BASE_URL; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let base_url = std::env::var("JUDGE_BASE_URL").ok()?;
    let auth_token = std::env::var("JUDGE_AUTH_TOKEN").ok();
    let language_id = std::env::var("JUDGE_LANGUAGE_ID")
      .ok()
      .and_then(|v| v.parse().ok())
      .unwrap_or(DEFAULT_LANGUAGE_ID);
    Self::build(base_url, auth_token, language_id)
  }

  pub fn from_config(cfg: &JudgeCfg) -> Option<Self> {
    Self::build(cfg.base_url.clone(), cfg.auth_token.clone(), cfg.language_id)
  }

  fn build(base_url: String, auth_token: Option<String>, language_id: i32) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;
    Some(Self { client, base_url, auth_token, language_id })
  }

  /// Package the submitted code plus the question's harness template and
  /// input files, and send the batch to the judge. Returns immediately with
  /// one queued entry per test-case run.
  #[instrument(level = "info", skip(self, question, submission, variables),
               fields(question = %question.id, submission = %submission.id))]
  pub async fn dispatch(
    &self,
    question: &Question,
    submission: &Submission,
    variables: &HashMap<String, VarValue>,
  ) -> Result<Vec<TestCaseResult>, JudgeError> {
    let QuestionKind::Code { harness_template, input_files } = &question.kind else {
      return Err(JudgeError::Malformed("dispatch on a non-code question".into()));
    };
    let files = match &submission.kind {
      SubmissionKind::Code { files, .. } => files.as_slice(),
      _ => &[],
    };

    let source = render_harness(harness_template, &submission.answer, variables);
    let source_b64 = B64.encode(&source);
    let additional: Vec<JudgeFileReq> = files
      .iter()
      .map(|f| JudgeFileReq { name: f.name.clone(), content: B64.encode(&f.content) })
      .collect();

    // One judge run per input file; a single run when the question has none.
    let entries: Vec<JudgeEntryReq> = if input_files.is_empty() {
      vec![JudgeEntryReq {
        language_id: self.language_id,
        source_code: source_b64,
        stdin: None,
        additional_files: additional,
      }]
    } else {
      input_files
        .iter()
        .map(|f| JudgeEntryReq {
          language_id: self.language_id,
          source_code: source_b64.clone(),
          stdin: Some(B64.encode(&f.content)),
          additional_files: additional.clone(),
        })
        .collect()
    };
    let entry_count = entries.len();

    let url = format!("{}/submissions/batch?base64_encoded=true", self.base_url);
    let res = self
      .authed(self.client.post(&url))
      .json(&BatchReq { submissions: entries })
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      return Err(JudgeError::Http { status, body: trunc_for_log(&body, 2000) });
    }

    let created: Vec<CreatedEntry> = res.json().await?;
    if created.is_empty() {
      return Err(JudgeError::Malformed("judge accepted the batch but returned no tokens".into()));
    }
    info!(target: "grading", submission = %submission.id, entries = entry_count, tokens = created.len(),
          "Judge batch dispatched");

    Ok(
      created
        .into_iter()
        .map(|c| TestCaseResult {
          status: JudgeStatus::queued(),
          token: Some(c.token),
          stdout: None,
          stderr: None,
        })
        .collect(),
    )
  }

  /// Fetch current per-entry results for previously dispatched tokens.
  #[instrument(level = "info", skip(self, tokens), fields(tokens = tokens.len()))]
  pub async fn fetch_results(&self, tokens: &[String]) -> Result<Vec<TestCaseResult>, JudgeError> {
    if tokens.is_empty() {
      return Ok(Vec::new());
    }
    let url = format!(
      "{}/submissions/batch?tokens={}&base64_encoded=true&fields=token,status,stdout,stderr",
      self.base_url,
      tokens.join(",")
    );
    let res = self.authed(self.client.get(&url)).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      return Err(JudgeError::Http { status, body: trunc_for_log(&body, 2000) });
    }

    let body: BatchResults = res.json().await?;
    Ok(body.submissions)
  }

  fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    let req = req
      .header(USER_AGENT, "praxis-backend/0.1")
      .header(CONTENT_TYPE, "application/json");
    match &self.auth_token {
      Some(token) => req.header("X-Auth-Token", token),
      None => req,
    }
  }
}

/// Render the harness template: the question's generated variables plus the
/// learner's source under the `{answer}` placeholder.
fn render_harness(template: &str, answer: &str, variables: &HashMap<String, VarValue>) -> String {
  let mut values = variables.clone();
  values.insert("answer".to_string(), VarValue::Text(answer.to_string()));
  render_text(template, &values)
}
