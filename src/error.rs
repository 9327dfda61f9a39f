//! Error types for photo analysis.

use crate::feedback::ParseFailure;
use crate::language::Language;
use std::time::Duration;

/// Maximum length of an API error body carried inside an error.
#[cfg(feature = "gemini")]
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while selecting or analyzing a photo.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    /// Required configuration (the API credential) is missing.
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable image: cancelled, permission denied, or unreadable.
    #[error("image selection failed: {0}")]
    Selection(String),

    /// API key rejected by the service.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Prompt or response was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The service answered with a shape we cannot use.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[cfg(feature = "gemini")]
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The model's text did not contain recognizable sections.
    #[error("failed to parse feedback: {0}")]
    Parse(#[from] ParseFailure),

    /// Both feedback lists came back empty.
    #[error("analysis produced no feedback")]
    EmptyAnalysis,

    /// `analyze` was triggered before any image was selected.
    #[error("no image selected")]
    NoImageSelected,

    /// An analysis is already in flight.
    #[error("an analysis is already in progress")]
    Busy,

    /// A new image was selected while the analysis was running.
    #[error("image changed during analysis, result discarded")]
    Stale,
}

/// Broad error categories surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fatal at startup.
    Configuration,
    /// User retries selection.
    Selection,
    /// User retries analysis.
    Transport,
    /// User retries analysis, possibly on the same image.
    Parse,
    /// Caller misuse of the session; nothing to report to the service.
    Session,
}

impl FeedbackError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Selection(_) => ErrorKind::Selection,
            Self::Auth(_)
            | Self::Api { .. }
            | Self::RateLimited { .. }
            | Self::ContentBlocked(_)
            | Self::UnexpectedResponse(_)
            | Self::InvalidRequest(_) => ErrorKind::Transport,
            #[cfg(feature = "gemini")]
            Self::Network(_) => ErrorKind::Transport,
            Self::Parse(_) | Self::EmptyAnalysis => ErrorKind::Parse,
            Self::NoImageSelected | Self::Busy | Self::Stale => ErrorKind::Session,
        }
    }

    /// Returns false only for errors that must stop the program.
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::Configuration
    }

    /// Returns the suggested wait before the user retries, if the service sent one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Returns the message shown to the user next to the retry action.
    pub fn user_message(&self, language: Language) -> String {
        match (self.kind(), language) {
            (ErrorKind::Transport | ErrorKind::Parse, lang) => lang.analysis_failed().to_string(),
            (ErrorKind::Selection, Language::En) => {
                "Please try selecting a different image or check if the image format is supported (JPEG, PNG).".to_string()
            }
            (ErrorKind::Selection, Language::He) => {
                "אנא נסה לבחור תמונה אחרת או בדוק שפורמט התמונה נתמך (JPEG, PNG).".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for photo analysis operations.
pub type Result<T> = std::result::Result<T, FeedbackError>;

/// Redacts API keys from an error body and truncates it.
#[cfg(feature = "gemini")]
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let redacted: String = text
        .split_whitespace()
        .map(|word| {
            let core = word.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '-');
            if core.starts_with("AIza") && core.len() >= 30 {
                word.replace(core, "[REDACTED]")
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if redacted.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = redacted.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{truncated}...")
    } else {
        redacted
    }
}

/// Reads a `Retry-After` header given in seconds.
#[cfg(feature = "gemini")]
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_recoverable() {
        assert!(!FeedbackError::Config("no key".into()).is_recoverable());

        assert!(FeedbackError::Selection("cancelled".into()).is_recoverable());
        assert!(FeedbackError::RateLimited { retry_after: None }.is_recoverable());
        assert!(FeedbackError::Parse(ParseFailure::Unparseable).is_recoverable());
        assert!(FeedbackError::EmptyAnalysis.is_recoverable());
        assert!(FeedbackError::Busy.is_recoverable());
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            FeedbackError::Config("x".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            FeedbackError::ContentBlocked("x".into()).kind(),
            ErrorKind::Transport
        );
        assert_eq!(FeedbackError::EmptyAnalysis.kind(), ErrorKind::Parse);
        assert_eq!(FeedbackError::Stale.kind(), ErrorKind::Session);
    }

    #[test]
    fn test_retry_after() {
        let rate_limited = FeedbackError::RateLimited {
            retry_after: Some(Duration::from_secs(60)),
        };
        assert_eq!(rate_limited.retry_after(), Some(Duration::from_secs(60)));
        assert_eq!(FeedbackError::Auth("bad".into()).retry_after(), None);
    }

    #[test]
    fn test_user_message_is_localized() {
        let err = FeedbackError::Parse(ParseFailure::Unparseable);
        assert_eq!(
            err.user_message(Language::En),
            "Failed to analyze image. Please try again."
        );
        assert_eq!(
            err.user_message(Language::He),
            "ניתוח התמונה נכשל. אנא נסה שוב."
        );

        let err = FeedbackError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.user_message(Language::En), Language::En.analysis_failed());
    }

    #[test]
    fn test_error_display() {
        let err = FeedbackError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");
        assert_eq!(
            FeedbackError::EmptyAnalysis.to_string(),
            "analysis produced no feedback"
        );
    }

    #[cfg(feature = "gemini")]
    #[test]
    fn test_sanitize_redacts_api_key() {
        let msg = "invalid key AIzaSyA1234567890abcdefghijklmnopqrstu provided";
        let clean = sanitize_error_message(msg);
        assert!(!clean.contains("AIzaSy"));
        assert!(clean.contains("[REDACTED]"));
    }

    #[cfg(feature = "gemini")]
    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(2000);
        let clean = sanitize_error_message(&long);
        assert!(clean.len() < 600);
        assert!(clean.ends_with("..."));
    }

    #[cfg(feature = "gemini")]
    #[test]
    fn test_parse_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);
        headers.insert(reqwest::header::RETRY_AFTER, "30".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(30));
    }
}
