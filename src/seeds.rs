//! Built-in sample content so the server is useful without external config:
//! a demo learner and instructor, one category with token values, an open
//! practice event, and one question of each kind.

use chrono::Utc;

use crate::domain::{
  default_submission_quota, Category, Choice, Difficulty, Event, EventKind, InputFile, Question,
  QuestionKind, Role, TokenValue, User,
};
use crate::variables::VariableSpec;

pub fn seed_users() -> Vec<User> {
  vec![
    User { id: "demo-learner".into(), name: "Demo Learner".into(), role: Role::Learner },
    User { id: "demo-instructor".into(), name: "Demo Instructor".into(), role: Role::Instructor },
  ]
}

pub fn seed_categories() -> Vec<Category> {
  vec![
    Category {
      id: "java-basics".into(),
      name: "Java Basics".into(),
      description: "Expressions, variables, and control flow.".into(),
      parent: None,
      next_categories: vec!["java-loops".into()],
    },
    Category {
      id: "java-loops".into(),
      name: "Loops".into(),
      description: "Iteration and accumulation patterns.".into(),
      parent: Some("java-basics".into()),
      next_categories: vec![],
    },
  ]
}

pub fn seed_events() -> Vec<Event> {
  vec![Event {
    id: "practice-week-1".into(),
    name: "Practice Week 1".into(),
    kind: EventKind::Assignment,
    open: true,
  }]
}

/// Default-valued token values for every seeded (category, difficulty) pair.
pub fn seed_token_values() -> Vec<TokenValue> {
  let mut values = Vec::new();
  for category in ["java-basics", "java-loops"] {
    for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
      values.push(TokenValue::new(category.into(), difficulty, None));
    }
  }
  values
}

pub fn seed_questions(events: &[Event]) -> Vec<Question> {
  let practice = events.iter().find(|e| e.id == "practice-week-1");
  let now = Utc::now();

  vec![
    Question {
      id: "sample-loop-count".into(),
      title: "Loop iterations".into(),
      text: "How many times does `for (int i = 0; i < {n}; i++)` run its body?".into(),
      answer: Some("a".into()),
      tutorial: Some("The loop runs while `i < {n}`, starting at 0.".into()),
      max_submissions: default_submission_quota(practice),
      author: Some("demo-instructor".into()),
      category: Some("java-loops".into()),
      difficulty: Difficulty::Easy,
      is_verified: true,
      event: practice.map(|e| e.id.clone()),
      variables: vec![VariableSpec::Int { name: "n".into(), min: 3, max: 30 }],
      kind: QuestionKind::MultipleChoice {
        choices: vec![
          Choice { key: "a".into(), text: "{n}".into() },
          Choice { key: "b".into(), text: "0".into() },
          Choice { key: "c".into(), text: "1".into() },
          Choice { key: "d".into(), text: "it never stops".into() },
        ],
        visible_distractors: 2,
      },
      created_at: now,
      modified_at: now,
    },
    Question {
      id: "sample-primitive-types".into(),
      title: "Primitive types".into(),
      text: "Select every primitive type.".into(),
      answer: Some("a,c".into()),
      tutorial: None,
      max_submissions: default_submission_quota(practice),
      author: Some("demo-instructor".into()),
      category: Some("java-basics".into()),
      difficulty: Difficulty::Normal,
      is_verified: true,
      event: practice.map(|e| e.id.clone()),
      variables: vec![],
      kind: QuestionKind::Checkbox {
        choices: vec![
          Choice { key: "a".into(), text: "int".into() },
          Choice { key: "b".into(), text: "String".into() },
          Choice { key: "c".into(), text: "boolean".into() },
          Choice { key: "d".into(), text: "Integer".into() },
        ],
        visible_distractors: 3,
      },
      created_at: now,
      modified_at: now,
    },
    Question {
      id: "sample-sum-digits".into(),
      title: "Sum of digits".into(),
      text: "Write `int sumDigits(int n)` returning the digit sum of `n`.".into(),
      answer: None,
      tutorial: None,
      max_submissions: default_submission_quota(practice),
      author: Some("demo-instructor".into()),
      category: Some("java-basics".into()),
      difficulty: Difficulty::Hard,
      is_verified: true,
      event: practice.map(|e| e.id.clone()),
      variables: vec![],
      kind: QuestionKind::Code {
        harness_template: "{answer}\n// harness prints a JUnit-style report to stdout\n".into(),
        input_files: vec![InputFile { name: "cases.txt".into(), content: "12\n305\n0\n".into() }],
      },
      created_at: now,
      modified_at: now,
    },
  ]
}
