//! Feedback record produced by a successful analysis.

use crate::error::{FeedbackError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Header written before the positives list in canonical response text.
pub(crate) const POSITIVES_HEADER: &str = "Positives:";
/// Header written before the suggestions list in canonical response text.
pub(crate) const SUGGESTIONS_HEADER: &str = "Suggestions:";

/// Positive observations and improvement suggestions, in model order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[must_use = "feedback should be displayed or stored"]
pub struct FeedbackResult {
    /// What works well in the photo.
    pub positives: Vec<String>,
    /// What could be improved.
    pub suggestions: Vec<String>,
}

impl FeedbackResult {
    /// Creates a result from the two lists.
    pub fn new(positives: Vec<String>, suggestions: Vec<String>) -> Self {
        Self {
            positives,
            suggestions,
        }
    }

    /// Returns true when both lists are empty.
    pub fn is_empty(&self) -> bool {
        self.positives.is_empty() && self.suggestions.is_empty()
    }

    /// Rejects a result with nothing in either list.
    ///
    /// The parser accepts such results; callers treat them as a failed
    /// analysis.
    pub fn non_empty(self) -> Result<Self> {
        if self.is_empty() {
            Err(FeedbackError::EmptyAnalysis)
        } else {
            Ok(self)
        }
    }

    /// Renders the result in the format the model is asked to produce.
    ///
    /// Parsing the returned text yields an equal result.
    pub fn to_response_text(&self) -> String {
        let mut out = String::new();
        out.push_str(POSITIVES_HEADER);
        out.push('\n');
        for item in &self.positives {
            let _ = writeln!(out, "- {item}");
        }
        out.push('\n');
        out.push_str(SUGGESTIONS_HEADER);
        out.push('\n');
        for item in &self.suggestions {
            let _ = writeln!(out, "- {item}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty() {
        assert!(FeedbackResult::default().is_empty());
        assert!(!FeedbackResult::new(vec![], vec!["x".into()]).is_empty());
    }

    #[test]
    fn test_non_empty_rejects_empty_result() {
        let err = FeedbackResult::default().non_empty().unwrap_err();
        assert!(matches!(err, FeedbackError::EmptyAnalysis));

        let ok = FeedbackResult::new(vec!["Sharp".into()], vec![]).non_empty();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_response_text_layout() {
        let result = FeedbackResult::new(vec!["A".into(), "B".into()], vec!["C".into()]);
        assert_eq!(
            result.to_response_text(),
            "Positives:\n- A\n- B\n\nSuggestions:\n- C\n"
        );
    }

    #[test]
    fn test_serializes_both_lists() {
        let result = FeedbackResult::new(vec!["A".into()], vec![]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["positives"][0], "A");
        assert!(json["suggestions"].as_array().unwrap().is_empty());
    }
}
