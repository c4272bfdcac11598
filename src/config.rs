//! Loading backend configuration (judge endpoint + content bank) from TOML.
//!
//! See `AppConfig` for the expected schema. Everything is optional: with no
//! config file the server runs on built-in seed content and without a judge.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Category, Difficulty, Event, QuestionKind, User};
use crate::variables::VariableSpec;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub judge: Option<JudgeCfg>,
  #[serde(default)]
  pub users: Vec<User>,
  #[serde(default)]
  pub categories: Vec<Category>,
  #[serde(default)]
  pub events: Vec<Event>,
  #[serde(default)]
  pub token_values: Vec<TokenValueCfg>,
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

/// External judge endpoint. `JUDGE_BASE_URL` in the environment takes
/// precedence over this section.
#[derive(Clone, Debug, Deserialize)]
pub struct JudgeCfg {
  pub base_url: String,
  #[serde(default)]
  pub auth_token: Option<String>,
  #[serde(default = "default_language_id")]
  pub language_id: i32,
}

fn default_language_id() -> i32 {
  62 // Java (OpenJDK)
}

/// Token value entry. An absent `value` falls back to the per-difficulty
/// default when the entry is constructed.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenValueCfg {
  pub category: String,
  pub difficulty: Difficulty,
  #[serde(default)]
  pub value: Option<f64>,
}

/// Question entry accepted in TOML configuration. Quota defaults that depend
/// on the bound event are applied when the bank is loaded into the store.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  #[serde(default)]
  pub id: Option<String>,
  pub title: String,
  pub text: String,
  #[serde(default)]
  pub answer: Option<String>,
  #[serde(default)]
  pub tutorial: Option<String>,
  #[serde(default)]
  pub max_submissions: Option<u32>,
  #[serde(default)]
  pub author: Option<String>,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default = "default_difficulty")]
  pub difficulty: Difficulty,
  #[serde(default)]
  pub is_verified: bool,
  #[serde(default)]
  pub event: Option<String>,
  #[serde(default)]
  pub variables: Vec<VariableSpec>,
  #[serde(flatten)]
  pub kind: QuestionKind,
}

fn default_difficulty() -> Difficulty {
  Difficulty::Easy
}

/// Attempt to load `AppConfig` from CONFIG_PATH. On any parsing/IO error,
/// returns None and the caller runs on defaults.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "praxis_backend", %path, "Loaded backend config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "praxis_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "praxis_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
