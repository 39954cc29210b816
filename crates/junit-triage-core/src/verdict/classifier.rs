//! Failure-message classifier
//!
//! Pulls the first `Error:` segment out of a raw failure body and sorts it
//! into an [`IssueCategory`]. Total: every input yields a [`RootCause`],
//! unrecognizable bodies fall back to [`IssueCategory::Script`].

use std::sync::LazyLock;

use regex::Regex;

use super::{IssueCategory, RootCause};

/// Characters trimmed from both the raw input and the final message
const TRIM_CHARS: &[char] = &['\t', '\n', '\u{0B}', '\u{0C}', '\r', ' '];

/// Message reported when no `Error:` segment can be extracted
pub const PANIC_MESSAGE: &str = "panic in execution";

/// Emitted by HTTP clients when an upstream answered outside 2xx
const HTTP_RANGE_MARKER: &str =
    "HTTP status code is not in the range 200~299, but the response is not nil";
const HTTP_RANGE_MARKER_WITH_COMMA: &str =
    "HTTP status code is not in the range 200~299, but the response is not nil,";

/// Rendering of a wrapped native error value
const ERROR_STRING_MARKER: &str = " &errors.errorString{";

/// Struct-field rendering that leaks into quoted messages
const QUOTED_FIELD_ARTIFACT: &str = "s:\"";

/// First `Error:` segment, ending at a line break, a `Test:` trailer, or the
/// end of the text (the input is trimmed before matching). Tabs do not end
/// the segment: testify pads the `Error:` label with one.
static ERROR_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Error:(.*?)(?:[\n\r]|\s+Test:|$)").expect("Invalid error segment regex")
});

/// `&errors.errorString{s:"..."}` wrapper, capturing the inner text
static ERROR_STRING_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"&errors\.errorString\{s:"(.*?)"\}"#).expect("Invalid errorString regex")
});

/// Classify a raw failure message into a root cause.
///
/// Only the first `Error:` occurrence is considered. Category precedence:
/// the HTTP-range marker (`Infrastructure`) beats the wrapped-error marker
/// (`ConfigOrDb`), which beats the default `Assertion`.
#[must_use]
pub fn classify(failure_message: &str) -> RootCause {
    let trimmed = failure_message.trim_matches(TRIM_CHARS);

    let Some(segment) = extract_error_segment(trimmed) else {
        return RootCause::new(IssueCategory::Script, PANIC_MESSAGE);
    };

    let (category, message) = categorize(segment);
    RootCause::new(category, normalize_message(&message))
}

/// Text between the first `Error:` marker and its terminator, if any.
#[must_use]
pub fn extract_error_segment(text: &str) -> Option<&str> {
    ERROR_SEGMENT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn categorize(segment: &str) -> (IssueCategory, String) {
    // Wrapped errors are only unwrapped when they decide the category
    if segment.contains(HTTP_RANGE_MARKER) {
        let message = segment
            .replace(HTTP_RANGE_MARKER_WITH_COMMA, "")
            .replace(HTTP_RANGE_MARKER, "");
        return (IssueCategory::Infrastructure, message);
    }

    if segment.contains(ERROR_STRING_MARKER) {
        let message = ERROR_STRING_WRAPPER.replace_all(segment, "${1}");
        return (IssueCategory::ConfigOrDb, message.into_owned());
    }

    (IssueCategory::Assertion, segment.to_string())
}

/// Trim control characters and strip `s:"` artifacts.
///
/// Idempotent: normalizing an already-normalized message returns it unchanged.
#[must_use]
pub fn normalize_message(message: &str) -> String {
    let mut cleaned = message.trim_matches(TRIM_CHARS).to_string();
    // Removal can splice a new artifact together, e.g. `s:s:""`
    while cleaned.contains(QUOTED_FIELD_ARTIFACT) {
        cleaned = cleaned.replace(QUOTED_FIELD_ARTIFACT, "");
    }
    cleaned.trim_matches(TRIM_CHARS).to_string()
}
