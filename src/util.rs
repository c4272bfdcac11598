//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { s.to_string() } else { format!("{}… ({} bytes total)", &s[..max], s.len()) }
}

/// Clamp a score into the [0, 1] range the reward ledger expects.
pub fn clamp_unit(x: f64) -> f64 {
  if x < 0.0 { 0.0 } else if x > 1.0 { 1.0 } else { x }
}
