//! Core types for photo analysis requests.

use crate::image::ImagePayload;
use crate::language::Language;
use crate::prompt::analysis_prompt;
use serde::{Deserialize, Serialize};

/// Analysis provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini multimodal models.
    Gemini,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// A request to critique one photo.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Instruction text sent ahead of the image.
    pub prompt: String,
    /// The photo, sent inline.
    pub image: ImagePayload,
    /// Language the feedback should be written in.
    pub language: Language,
}

impl AnalysisRequest {
    /// Creates a request using the standard feedback prompt for `language`.
    pub fn new(image: ImagePayload, language: Language) -> Self {
        Self {
            prompt: analysis_prompt(language),
            image,
            language,
        }
    }

    /// Replaces the prompt text.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageFormat;

    #[test]
    fn test_request_uses_language_prompt() {
        let payload = ImagePayload::new(vec![0xFF, 0xD8], ImageFormat::Jpeg);
        let request = AnalysisRequest::new(payload, Language::He);
        assert_eq!(request.prompt, analysis_prompt(Language::He));
        assert_eq!(request.language, Language::He);
    }

    #[test]
    fn test_with_prompt_overrides_text() {
        let payload = ImagePayload::new(vec![], ImageFormat::Png);
        let request = AnalysisRequest::new(payload, Language::En).with_prompt("Describe it");
        assert_eq!(request.prompt, "Describe it");
    }

    #[test]
    fn test_provider_kind_display() {
        assert_eq!(ProviderKind::Gemini.to_string(), "gemini");
    }
}
