//! Decoding of judge output: base64 captures and the JUnit-style XML test
//! report the harness prints to stdout.
//!
//! The judge's encoding is part of an existing deployment's contract, so the
//! decoding here is deliberately lenient: anything malformed degrades to
//! "zero passing tests" rather than an error. The parser is a hand-rolled
//! scan; the reports are machine-emitted and flat, a full XML stack is not
//! warranted.

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use serde::Serialize;

use crate::domain::TestCaseResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
  Pass,
  Fail,
}

/// One entry of the decoded test report.
#[derive(Clone, Debug, Serialize)]
pub struct TestCase {
  pub name: String,
  pub status: TestStatus,
}

/// Decode an optional base64 capture field; malformed input decodes to "".
pub fn decode_capture(field: Option<&str>) -> String {
  let raw = field.unwrap_or("");
  match B64.decode(raw) {
    Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    Err(_) => String::new(),
  }
}

/// Decode the structured test report of a result set. The harness process
/// emits one consolidated report on the first entry's stdout.
pub fn decoded_report(results: &[TestCaseResult]) -> Vec<TestCase> {
  match results.first() {
    Some(first) => parse_test_report(&decode_capture(first.stdout.as_deref())),
    None => Vec::new(),
  }
}

pub fn decoded_stderr(results: &[TestCaseResult]) -> String {
  match results.first() {
    Some(first) => decode_capture(first.stderr.as_deref()),
    None => String::new(),
  }
}

/// Parse a JUnit-style report: one `<testcase name="...">` element per test,
/// failed when it contains a `<failure>` or `<error>` child. Unparseable
/// fragments are skipped; a report with no recognizable test cases counts as
/// zero tests.
pub fn parse_test_report(xml: &str) -> Vec<TestCase> {
  let mut cases = Vec::new();
  let mut rest = xml;

  while let Some(start) = rest.find("<testcase") {
    rest = &rest[start + "<testcase".len()..];
    let Some(tag_end) = rest.find('>') else { break };
    let attrs = &rest[..tag_end];
    let name = attr_value(attrs, "name").unwrap_or_default().to_string();

    if attrs.trim_end().ends_with('/') {
      cases.push(TestCase { name, status: TestStatus::Pass });
      rest = &rest[tag_end + 1..];
      continue;
    }

    let body_start = tag_end + 1;
    let (body, consumed) = match rest[body_start..].find("</testcase>") {
      Some(i) => (&rest[body_start..body_start + i], body_start + i + "</testcase>".len()),
      None => (&rest[body_start..], rest.len()),
    };
    let failed = body.contains("<failure") || body.contains("<error");
    cases.push(TestCase {
      name,
      status: if failed { TestStatus::Fail } else { TestStatus::Pass },
    });
    rest = &rest[consumed..];
  }

  cases
}

pub fn passed_count(report: &[TestCase]) -> usize {
  report.iter().filter(|t| t.status == TestStatus::Pass).count()
}

/// "passed/total" summary line shown next to a code submission.
pub fn test_summary(results: &[TestCaseResult]) -> String {
  let report = decoded_report(results);
  format!("{}/{}", passed_count(&report), report.len())
}

fn attr_value<'a>(attrs: &'a str, key: &str) -> Option<&'a str> {
  // A leading space keeps `name=` from matching inside `classname=`.
  let needle = format!(" {}=\"", key);
  let i = attrs.find(&needle)? + needle.len();
  let rest = &attrs[i..];
  Some(&rest[..rest.find('"')?])
}
