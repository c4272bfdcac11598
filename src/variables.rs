//! Seeded variable generation and template rendering.
//!
//! Flow:
//! 1) A question declares named variable descriptors (integer range, float
//!    range, or a choice list).
//! 2) `generate_variables` draws values with a PRNG seeded from the
//!    junction's seed, so every learner sees their own stable parameters.
//! 3) `render_text` substitutes `{name}` placeholders into question, choice,
//!    and tutorial text.
//!
//! Generation is a pure function of (spec, seed): the seeded source is
//! constructed fresh per call and never shared, so concurrent renderings for
//! different junctions cannot interfere.

use std::collections::{HashMap, HashSet};
use std::fmt;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::Choice;

/// One named variable descriptor of a question's variable specification.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VariableSpec {
  Int { name: String, min: i64, max: i64 },
  Float { name: String, min: f64, max: f64 },
  Choice { name: String, options: Vec<String> },
}

impl VariableSpec {
  pub fn name(&self) -> &str {
    match self {
      VariableSpec::Int { name, .. } => name,
      VariableSpec::Float { name, .. } => name,
      VariableSpec::Choice { name, .. } => name,
    }
  }
}

/// A generated variable value.
#[derive(Clone, Debug, PartialEq)]
pub enum VarValue {
  Int(i64),
  Float(f64),
  Text(String),
}

impl fmt::Display for VarValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VarValue::Int(v) => write!(f, "{}", v),
      VarValue::Float(v) => write!(f, "{}", v),
      VarValue::Text(v) => write!(f, "{}", v),
    }
  }
}

/// Generate values for every descriptor in `specs`, deterministically in
/// `(specs, seed)`.
///
/// Descriptors are evaluated independently in declaration order. A malformed
/// descriptor contributes a diagnostic string instead of aborting the whole
/// generation; valid descriptors still produce values. Malformed descriptors
/// draw nothing from the source, so their presence does not shift the values
/// of later variables.
pub fn generate_variables(
  specs: &[VariableSpec],
  seed: u64,
) -> (HashMap<String, VarValue>, Vec<String>) {
  let mut rng = StdRng::seed_from_u64(seed);
  let mut values = HashMap::new();
  let mut errors = Vec::new();
  let mut seen = HashSet::new();

  for spec in specs {
    let name = spec.name();
    if !seen.insert(name.to_string()) {
      errors.push(format!("variable '{}': duplicate name", name));
      continue;
    }
    match spec {
      VariableSpec::Int { name, min, max } => {
        if min > max {
          errors.push(format!("variable '{}': empty range {}..{}", name, min, max));
          continue;
        }
        values.insert(name.clone(), VarValue::Int(rng.gen_range(*min..=*max)));
      }
      VariableSpec::Float { name, min, max } => {
        if min > max {
          errors.push(format!("variable '{}': empty range {}..{}", name, min, max));
          continue;
        }
        let raw: f64 = rng.gen_range(*min..=*max);
        values.insert(name.clone(), VarValue::Float((raw * 100.0).round() / 100.0));
      }
      VariableSpec::Choice { name, options } => {
        if options.is_empty() {
          errors.push(format!("variable '{}': no options to choose from", name));
          continue;
        }
        let idx = rng.gen_range(0..options.len());
        values.insert(name.clone(), VarValue::Text(options[idx].clone()));
      }
    }
  }

  (values, errors)
}

/// Very small and safe string templating.
/// Replaces occurrences of `{name}` in the template with the value's display
/// form. Unresolved placeholders pass through unchanged, so a question whose
/// variable generation partially failed still renders.
pub fn render_text(template: &str, values: &HashMap<String, VarValue>) -> String {
  let mut out = template.to_string();
  for (k, v) in values {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, &v.to_string());
  }
  out
}

/// The visible-choice algorithm: keep the first `visible_distractors + 1`
/// choices in stored order, shuffle that truncated list with a source seeded
/// from the junction seed, then render each kept choice's text. Stable per
/// seed across repeated views; different seeds see different orders.
pub fn visible_choices(
  choices: &[Choice],
  visible_distractors: usize,
  seed: u64,
  values: &HashMap<String, VarValue>,
) -> Vec<Choice> {
  let take = (visible_distractors + 1).min(choices.len());
  let mut kept: Vec<Choice> = choices[..take].to_vec();
  let mut rng = StdRng::seed_from_u64(seed);
  kept.shuffle(&mut rng);
  kept
    .into_iter()
    .map(|c| Choice { text: render_text(&c.text, values), key: c.key })
    .collect()
}
