//! Application state: in-memory stores, seeded content, and the judge client.
//!
//! This module owns:
//!   - the read-mostly entity stores (users, categories, events, token
//!     values, questions), merged from TOML config and built-in seeds
//!   - the grade book: junctions, submissions, and the audit log behind a
//!     single lock, because the settle pass must observe and update them
//!     together (at-most-one credit per settlement)
//!   - the optional judge client
//!
//! The stores stand in for a durable record store; swapping in a database
//! would happen behind these accessors.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::{load_config_from_env, AppConfig, QuestionCfg};
use crate::domain::{
    default_submission_quota, Category, Difficulty, Event, Junction, Question, Submission,
    TokenValue, User,
};
use crate::judge::JudgeClient;
use crate::ledger::Action;
use crate::seeds;

/// Mutable grading state. Junctions, submissions, and audit actions share
/// one lock: the settle pass reads and writes all three atomically.
#[derive(Default)]
pub struct GradeBook {
    pub junctions: HashMap<(String, String), Junction>,
    pub submissions: HashMap<String, Submission>,
    pub actions: Vec<Action>,
}

impl GradeBook {
    pub fn attempts(&self, user_id: &str, question_id: &str) -> usize {
        self.submissions
            .values()
            .filter(|s| s.user_id == user_id && s.question_id == question_id)
            .count()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<RwLock<HashMap<String, User>>>,
    pub categories: Arc<RwLock<HashMap<String, Category>>>,
    pub events: Arc<RwLock<HashMap<String, Event>>>,
    pub token_values: Arc<RwLock<HashMap<(String, Difficulty), f64>>>,
    pub questions: Arc<RwLock<HashMap<String, Question>>>,
    pub grade_book: Arc<RwLock<GradeBook>>,
    pub judge: Option<JudgeClient>,
}

impl AppState {
    /// Build state from env: load config, merge seed content, init judge.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::with_config(load_config_from_env().unwrap_or_default())
    }

    pub fn with_config(cfg: AppConfig) -> Self {
        let mut users = HashMap::new();
        for u in &cfg.users {
            users.insert(u.id.clone(), u.clone());
        }
        for u in seeds::seed_users() {
            users.entry(u.id.clone()).or_insert(u);
        }

        let mut categories = HashMap::new();
        for c in &cfg.categories {
            categories.insert(c.id.clone(), c.clone());
        }
        for c in seeds::seed_categories() {
            categories.entry(c.id.clone()).or_insert(c);
        }

        let mut events = HashMap::new();
        for e in &cfg.events {
            events.insert(e.id.clone(), e.clone());
        }
        for e in seeds::seed_events() {
            events.entry(e.id.clone()).or_insert(e);
        }
        let event_list: Vec<Event> = events.values().cloned().collect();

        let mut token_values = HashMap::new();
        for tv in &cfg.token_values {
            let tv = TokenValue::new(tv.category.clone(), tv.difficulty, tv.value);
            token_values.insert((tv.category, tv.difficulty), tv.value);
        }
        for tv in seeds::seed_token_values() {
            token_values.entry((tv.category, tv.difficulty)).or_insert(tv.value);
        }

        let mut questions = HashMap::new();
        for q in &cfg.questions {
            let q = build_question(q.clone(), &events);
            questions.insert(q.id.clone(), q);
        }
        for q in seeds::seed_questions(&event_list) {
            questions.entry(q.id.clone()).or_insert(q);
        }

        // Inventory summary by question kind.
        let mut count_by_kind: HashMap<&'static str, usize> = HashMap::new();
        for q in questions.values() {
            *count_by_kind.entry(q.kind.type_name()).or_insert(0) += 1;
        }
        for (kind, count) in count_by_kind {
            info!(target: "grading", %kind, count, "Startup question inventory");
        }

        let judge = JudgeClient::from_env()
            .or_else(|| cfg.judge.as_ref().and_then(JudgeClient::from_config));
        if let Some(j) = &judge {
            info!(target: "praxis_backend", base_url = %j.base_url, language_id = j.language_id, "Judge enabled.");
        } else {
            info!(target: "praxis_backend", "Judge disabled (no JUDGE_BASE_URL). Code submissions stay in evaluation.");
        }

        Self {
            users: Arc::new(RwLock::new(users)),
            categories: Arc::new(RwLock::new(categories)),
            events: Arc::new(RwLock::new(events)),
            token_values: Arc::new(RwLock::new(token_values)),
            questions: Arc::new(RwLock::new(questions)),
            grade_book: Arc::new(RwLock::new(GradeBook::default())),
            judge,
        }
    }

    pub async fn user(&self, id: &str) -> Option<User> {
        self.users.read().await.get(id).cloned()
    }

    pub async fn question(&self, id: &str) -> Option<Question> {
        self.questions.read().await.get(id).cloned()
    }

    pub async fn submission(&self, id: &str) -> Option<Submission> {
        self.grade_book.read().await.submissions.get(id).cloned()
    }

    pub async fn event_for(&self, question: &Question) -> Option<Event> {
        let id = question.event.as_deref()?;
        self.events.read().await.get(id).cloned()
    }

    /// External token-value lookup: None when the pair is unconfigured.
    /// Callers decide whether that is a fault (it is, at credit time).
    pub async fn token_value(&self, category: Option<&str>, difficulty: Difficulty) -> Option<f64> {
        let category = category?;
        self.token_values
            .read()
            .await
            .get(&(category.to_string(), difficulty))
            .copied()
    }

    /// Get or lazily create the junction for (user, question). The seed is
    /// assigned exactly once here and never changes afterwards.
    #[instrument(level = "debug", skip(self))]
    pub async fn ensure_junction(&self, user_id: &str, question_id: &str) -> Junction {
        let key = (user_id.to_string(), question_id.to_string());
        let mut book = self.grade_book.write().await;
        book.junctions
            .entry(key)
            .or_insert_with(|| Junction::new(user_id.to_string(), question_id.to_string()))
            .clone()
    }

    pub async fn mark_viewed(&self, user_id: &str, question_id: &str) {
        let key = (user_id.to_string(), question_id.to_string());
        let mut book = self.grade_book.write().await;
        if let Some(j) = book.junctions.get_mut(&key) {
            j.last_viewed = Some(Utc::now());
        }
    }

    /// Marking the tutorial opened closes the junction for further
    /// submissions by learners.
    pub async fn open_tutorial(&self, user_id: &str, question_id: &str) -> bool {
        let key = (user_id.to_string(), question_id.to_string());
        let mut book = self.grade_book.write().await;
        match book.junctions.get_mut(&key) {
            Some(j) => {
                j.opened_tutorial = true;
                true
            }
            None => false,
        }
    }

    pub async fn actions_for(&self, user_id: &str) -> Vec<Action> {
        self.grade_book
            .read()
            .await
            .actions
            .iter()
            .filter(|a| a.actor == user_id)
            .cloned()
            .collect()
    }
}

fn build_question(cfg: QuestionCfg, events: &HashMap<String, Event>) -> Question {
    let event = cfg.event.as_deref().and_then(|id| events.get(id));
    let max_submissions = cfg
        .max_submissions
        .unwrap_or_else(|| default_submission_quota(event));
    let now = Utc::now();
    Question {
        id: cfg.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        title: cfg.title,
        text: cfg.text,
        answer: cfg.answer,
        tutorial: cfg.tutorial,
        max_submissions,
        author: cfg.author,
        category: cfg.category,
        difficulty: cfg.difficulty,
        is_verified: cfg.is_verified,
        event: cfg.event,
        variables: cfg.variables,
        kind: cfg.kind,
        created_at: now,
        modified_at: now,
    }
}
