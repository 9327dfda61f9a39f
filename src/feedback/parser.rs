//! Extraction of the two feedback lists from free-form model output.
//!
//! The model is asked for a `Positives:` block and a `Suggestions:` block of
//! bulleted lines. Its output drifts: headers get localized or wrapped in
//! Markdown, bullets switch between `-`, `*` and numbers, sections swap
//! places. The parser looks for each header independently and takes the
//! bulleted lines under it, so any of these variations still yields a
//! result.

use crate::feedback::types::FeedbackResult;
use regex::Regex;
use std::sync::LazyLock;

/// A leading bullet: `-`, `*`, `•`, or `1.` / `1)`, followed by whitespace.
static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•]|\d{1,2}[.)])\s+").expect("valid regex"));

/// A line consisting only of a label, optionally numbered, decorated as a
/// Markdown heading, bold or italic text, and followed by a colon.
///
/// A single `*` or `_` must touch the label, so a bullet like `* Strengths`
/// is never taken for a header.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:#{1,6}\s*)?(?:\d{1,2}[.)]\s*)?(?:(?:\*\*|__)\s*|[*_])?(?P<label>[^\s:*#_][^:*#_]*?)\s*(?:\*\*|__|[*_])?\s*:?\s*(?:\*\*|__|[*_])?$",
    )
    .expect("valid regex")
});

const POSITIVE_LABELS: &[&str] = &[
    "positives",
    "positive",
    "positive feedback",
    "positive observations",
    "positive aspects",
    "strengths",
    "what's great",
    "חיוביים",
    "חיובי",
    "נקודות חיוביות",
    "דברים חיוביים",
];

const SUGGESTION_LABELS: &[&str] = &[
    "suggestions",
    "suggestion",
    "suggestions for improvement",
    "improvements",
    "areas for improvement",
    "הצעות",
    "הצעות לשיפור",
    "שיפורים",
    "המלצות",
];

/// Why a response could not be turned into feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    /// Neither section header appears in the text.
    #[error("response contains no recognizable feedback sections")]
    Unparseable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Positives,
    Suggestions,
}

/// Parses raw model text into a [`FeedbackResult`].
///
/// A missing section yields an empty list. Only text with no recognizable
/// header at all is rejected. A result with both lists empty is returned as
/// is; see [`FeedbackResult::non_empty`].
pub fn parse(raw_text: &str) -> Result<FeedbackResult, ParseFailure> {
    let lines: Vec<&str> = raw_text.lines().map(str::trim).collect();

    let mut positives_at = None;
    let mut suggestions_at = None;
    for (index, line) in lines.iter().enumerate() {
        match header_section(line) {
            Some(Section::Positives) if positives_at.is_none() => positives_at = Some(index),
            Some(Section::Suggestions) if suggestions_at.is_none() => {
                suggestions_at = Some(index)
            }
            _ => {}
        }
    }

    if positives_at.is_none() && suggestions_at.is_none() {
        tracing::debug!(len = raw_text.len(), "no feedback headers in response");
        return Err(ParseFailure::Unparseable);
    }

    Ok(FeedbackResult::new(
        positives_at.map(|at| block_items(&lines, at)).unwrap_or_default(),
        suggestions_at.map(|at| block_items(&lines, at)).unwrap_or_default(),
    ))
}

/// Collects the list items following the header at `header`.
///
/// The block ends at the first blank line after its content, at the next
/// header, or at the end of text. Blank lines right after the header are
/// skipped.
fn block_items(lines: &[&str], header: usize) -> Vec<String> {
    let mut items = Vec::new();
    let mut seen_content = false;

    for line in &lines[header + 1..] {
        if line.is_empty() {
            if seen_content {
                break;
            }
            continue;
        }
        if header_section(line).is_some() {
            break;
        }
        seen_content = true;
        if let Some(item) = strip_marker(line) {
            items.push(item.to_string());
        }
    }

    items
}

/// Strips one list marker from a trimmed line; `None` for non-list or empty items.
fn strip_marker(line: &str) -> Option<&str> {
    let marker = LIST_MARKER_RE.find(line)?;
    let item = line[marker.end()..].trim();
    (!item.is_empty()).then_some(item)
}

fn header_section(line: &str) -> Option<Section> {
    let caps = HEADER_RE.captures(line)?;
    let label = normalize_label(&caps["label"]);
    if POSITIVE_LABELS.contains(&label.as_str()) {
        Some(Section::Positives)
    } else if SUGGESTION_LABELS.contains(&label.as_str()) {
        Some(Section::Suggestions)
    } else {
        None
    }
}

fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{2019}', "'")
        .to_lowercase()
}
