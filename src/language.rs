//! Response language and text direction.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language the feedback is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Hebrew.
    He,
}

/// Text direction used when rendering feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Left to right.
    Ltr,
    /// Right to left.
    Rtl,
}

impl Language {
    /// Returns the language code forwarded to the model.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::He => "he",
        }
    }

    /// Returns the language name as used in the prompt.
    pub fn name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::He => "Hebrew",
        }
    }

    /// Returns the text direction for this language.
    pub fn direction(&self) -> TextDirection {
        match self {
            Self::En => TextDirection::Ltr,
            Self::He => TextDirection::Rtl,
        }
    }

    /// Returns the other language.
    pub fn toggle(self) -> Self {
        match self {
            Self::En => Self::He,
            Self::He => Self::En,
        }
    }

    /// Message shown when an analysis fails and can be retried.
    pub fn analysis_failed(&self) -> &'static str {
        match self {
            Self::En => "Failed to analyze image. Please try again.",
            Self::He => "ניתוח התמונה נכשל. אנא נסה שוב.",
        }
    }

    /// Heading for the positives list.
    pub fn positives_title(&self) -> &'static str {
        match self {
            Self::En => "What's Great",
            Self::He => "מה מצוין",
        }
    }

    /// Heading for the suggestions list.
    pub fn suggestions_title(&self) -> &'static str {
        match self {
            Self::En => "Suggestions",
            Self::He => "הצעות לשיפור",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::fmt::Display for TextDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ltr => write!(f, "ltr"),
            Self::Rtl => write!(f, "rtl"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "he" | "iw" | "hebrew" => Ok(Self::He),
            other => Err(format!("unsupported language: {other} (expected en or he)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_follows_code() {
        assert_eq!(Language::En.direction(), TextDirection::Ltr);
        assert_eq!(Language::He.direction(), TextDirection::Rtl);
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Language::En.toggle(), Language::He);
        assert_eq!(Language::He.toggle().toggle(), Language::He);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("EN".parse::<Language>(), Ok(Language::En));
        assert_eq!("hebrew".parse::<Language>(), Ok(Language::He));
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Language::He.to_string(), "he");
        assert_eq!(TextDirection::Rtl.to_string(), "rtl");
    }
}
