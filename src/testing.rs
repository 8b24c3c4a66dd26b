//! Test-facing assertion API
//!
//! Grammar tests pair a [`Matcher`] rooted at the production under test with
//! these two assertions. On the wrong outcome they panic with the failure
//! position, the deepest alternatives attempted, and a caret excerpt of the
//! input, so a failing production test reads like a parser diagnostic.
//!
//! Typically used together with [`crate::grammar::Grammar::mock`]: mock every
//! rule the production references, and its inputs become literal, composable
//! strings.

use miette::Report;

use crate::matcher::{MatchFailure, MatchOutcome, Matcher};

/// Panics unless the matcher's root rule matches `input` entirely.
#[track_caller]
pub fn assert_parses(matcher: &Matcher<'_>, input: &str) {
    match matcher.match_all(input) {
        Ok(MatchOutcome::Matched(_)) => {}
        Ok(MatchOutcome::Partial { end, .. }) => panic!(
            "rule '{}' matched only the first {} bytes of {:?}, leaving {:?} unconsumed",
            matcher.root(),
            end,
            input,
            &input[end..],
        ),
        Ok(MatchOutcome::Mismatch(failure)) => panic!(
            "rule '{}' did not match {:?}\n{}",
            matcher.root(),
            input,
            render_failure(input, &failure),
        ),
        Err(defect) => panic!(
            "matching aborted on a grammar defect:\n{:?}",
            Report::new(defect),
        ),
    }
}

/// Panics unless the matcher's root rule fails to match `input` entirely
/// (an ordinary mismatch or a partial match; grammar defects still panic).
#[track_caller]
pub fn assert_does_not_parse(matcher: &Matcher<'_>, input: &str) {
    match matcher.match_all(input) {
        Ok(MatchOutcome::Matched(_)) => panic!(
            "rule '{}' unexpectedly matched {:?} in full",
            matcher.root(),
            input,
        ),
        Ok(MatchOutcome::Partial { .. }) | Ok(MatchOutcome::Mismatch(_)) => {}
        Err(defect) => panic!(
            "matching aborted on a grammar defect:\n{:?}",
            Report::new(defect),
        ),
    }
}

/// Renders a mismatch as the offending line with a caret under the failure
/// position, followed by the expectation trace.
fn render_failure(input: &str, failure: &MatchFailure) -> String {
    let at = failure.at.min(input.len());
    let line_start = input[..at].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = input[at..]
        .find('\n')
        .map(|i| at + i)
        .unwrap_or(input.len());
    let line = &input[line_start..line_end];
    let caret_indent = " ".repeat(input[line_start..at].chars().count());
    format!("  {}\n  {}^ {}", line, caret_indent, failure)
}
