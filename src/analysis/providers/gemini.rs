//! Gemini (Google) photo analysis provider.

use crate::analysis::provider::AnalysisProvider;
use crate::analysis::types::{AnalysisRequest, ProviderKind};
use crate::error::{parse_retry_after, sanitize_error_message, FeedbackError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables consulted for the API key, in order.
const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GOOGLE_AI_KEY"];

/// Gemini model variants able to read images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 1.5 Flash.
    #[default]
    Flash15,
    /// Gemini 2.0 Flash.
    Flash20,
    /// Gemini 2.5 Flash.
    Flash25,
    /// Any other model identifier.
    Custom(String),
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Flash15 => "gemini-1.5-flash",
            Self::Flash20 => "gemini-2.0-flash",
            Self::Flash25 => "gemini-2.5-flash",
            Self::Custom(id) => id,
        }
    }

    /// Maps an identifier to a known variant, keeping unknown ones as custom.
    pub fn from_id(id: &str) -> Self {
        match id {
            "gemini-1.5-flash" => Self::Flash15,
            "gemini-2.0-flash" => Self::Flash20,
            "gemini-2.5-flash" => Self::Flash25,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// Builder for GeminiProvider.
#[derive(Debug, Clone, Default)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: Option<String>,
    temperature: Option<f32>,
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, then `GOOGLE_AI_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API origin (scheme and host).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Builds the provider, resolving the API key.
    ///
    /// A missing or blank key is a configuration error.
    pub fn build(self) -> Result<GeminiProvider> {
        let api_key = resolve_api_key(self.api_key, |var| std::env::var(var).ok())?;

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(FeedbackError::Config(format!(
                    "temperature must be between 0 and 2, got {t}"
                )));
            }
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            base_url,
            temperature: self.temperature,
        })
    }
}

/// Picks the explicit key, or else the first non-blank variable in
/// [`API_KEY_ENV_VARS`] as returned by `lookup`.
fn resolve_api_key(
    explicit: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    explicit
        .or_else(|| {
            API_KEY_ENV_VARS
                .iter()
                .find_map(|var| lookup(var).filter(|key| !key.trim().is_empty()))
        })
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            FeedbackError::Config("GOOGLE_API_KEY not set and no API key provided".into())
        })
}

/// Gemini photo analysis provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
    base_url: String,
    temperature: Option<f32>,
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    /// Returns the model this provider calls.
    pub fn model(&self) -> &GeminiModel {
        &self.model
    }

    async fn analyze_impl(&self, request: &AnalysisRequest) -> Result<String> {
        let start = Instant::now();

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        let body = GeminiRequest::from_analysis_request(request, self.temperature);

        tracing::debug!(
            model = self.model.as_str(),
            language = %request.language,
            image_bytes = request.image.size(),
            "sending analysis request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        // Blocked prompts come back as HTTP 200
        if let Some(ref feedback) = gemini_response.prompt_feedback {
            if let Some(ref reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .clone()
                    .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
                return Err(FeedbackError::ContentBlocked(msg));
            }
        }

        let candidate = gemini_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| {
                FeedbackError::UnexpectedResponse("No candidates in Gemini response".into())
            })?;

        if let Some(ref finish_reason) = candidate.finish_reason {
            match finish_reason.as_str() {
                "SAFETY" | "RECITATION" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII" => {
                    return Err(FeedbackError::ContentBlocked(format!(
                        "Content blocked by Gemini safety filter: {}",
                        finish_reason
                    )));
                }
                "MAX_TOKENS" => {
                    tracing::warn!("Gemini response truncated at token limit");
                }
                _ => {} // STOP etc. are normal
            }
        }

        let content = candidate.content.ok_or_else(|| {
            FeedbackError::UnexpectedResponse("No content in Gemini candidate".into())
        })?;

        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            return Err(FeedbackError::UnexpectedResponse(
                "No text in Gemini response".into(),
            ));
        }

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            chars = text.chars().count(),
            "analysis response received"
        );

        Ok(text)
    }

    fn parse_error(
        &self,
        status: u16,
        text: &str,
        headers: &reqwest::header::HeaderMap,
    ) -> FeedbackError {
        let text = sanitize_error_message(text);
        if status == 404 {
            return FeedbackError::InvalidRequest(format!(
                "Model {} not found. Verify the model name is correct.",
                self.model.as_str()
            ));
        }
        if status == 429 {
            let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
            return FeedbackError::RateLimited { retry_after };
        }
        if status == 401 || status == 403 {
            return FeedbackError::Auth(text);
        }
        let lower = text.to_lowercase();
        if lower.contains("safety") || lower.contains("blocked") || lower.contains("prohibited") {
            return FeedbackError::ContentBlocked(text);
        }
        FeedbackError::Api {
            status,
            message: text,
        }
    }
}

#[async_trait]
impl AnalysisProvider for GeminiProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String> {
        self.analyze_impl(request).await
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/v1beta/models/{}", self.base_url, self.model.as_str());

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(FeedbackError::Auth("Invalid API key".into())),
            404 => Err(FeedbackError::InvalidRequest(
                "Model not found. Verify the model name is correct.".into(),
            )),
            s if !(200..300).contains(&s) => Err(FeedbackError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    temperature: f32,
}

impl GeminiRequest {
    fn from_analysis_request(req: &AnalysisRequest, temperature: Option<f32>) -> Self {
        let parts = vec![
            GeminiRequestPart::Text {
                text: req.prompt.clone(),
            },
            GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: req.image.mime_type().to_string(),
                    data: req.image.to_base64(),
                },
            },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: temperature.map(|temperature| GeminiConfig { temperature }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ImageFormat, ImagePayload};
    use crate::language::Language;

    fn jpeg_request() -> AnalysisRequest {
        let payload = ImagePayload::new(vec![0xFF, 0xD8, 0xFF, 0xE0], ImageFormat::Jpeg);
        AnalysisRequest::new(payload, Language::En)
    }

    #[test]
    fn test_gemini_model_as_str() {
        assert_eq!(GeminiModel::Flash15.as_str(), "gemini-1.5-flash");
        assert_eq!(GeminiModel::Flash25.as_str(), "gemini-2.5-flash");
        assert_eq!(
            GeminiModel::Custom("gemini-exp".into()).as_str(),
            "gemini-exp"
        );
    }

    #[test]
    fn test_gemini_model_from_id() {
        assert_eq!(GeminiModel::from_id("gemini-2.0-flash"), GeminiModel::Flash20);
        assert_eq!(
            GeminiModel::from_id("gemini-pro-vision"),
            GeminiModel::Custom("gemini-pro-vision".into())
        );
    }

    #[test]
    fn test_gemini_model_default() {
        assert_eq!(GeminiModel::default(), GeminiModel::Flash15);
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let provider = GeminiProviderBuilder::new()
            .api_key("test-key")
            .model(GeminiModel::Flash20)
            .build()
            .unwrap();
        assert_eq!(provider.model(), &GeminiModel::Flash20);
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_builder_rejects_blank_key() {
        let result = GeminiProviderBuilder::new().api_key("   ").build();
        assert!(matches!(result, Err(FeedbackError::Config(_))));
    }

    fn env_of(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name: &str| {
            vars.iter()
                .find(|(var, _)| *var == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_resolve_key_env_order() {
        let env = env_of(&[("GOOGLE_AI_KEY", "second"), ("GOOGLE_API_KEY", " first ")]);
        assert_eq!(resolve_api_key(None, &env).unwrap(), "first");

        let env = env_of(&[("GOOGLE_AI_KEY", "second")]);
        assert_eq!(resolve_api_key(None, env).unwrap(), "second");
    }

    #[test]
    fn test_resolve_key_blank_env_is_missing() {
        let env = env_of(&[("GOOGLE_API_KEY", "  "), ("GOOGLE_AI_KEY", "second")]);
        assert_eq!(resolve_api_key(None, env).unwrap(), "second");

        let env = env_of(&[("GOOGLE_API_KEY", ""), ("GOOGLE_AI_KEY", "\t")]);
        assert!(matches!(
            resolve_api_key(None, env),
            Err(FeedbackError::Config(_))
        ));
    }

    #[test]
    fn test_resolve_key_none_is_config_error() {
        assert!(matches!(
            resolve_api_key(None, env_of(&[])),
            Err(FeedbackError::Config(_))
        ));
    }

    #[test]
    fn test_resolve_key_explicit_wins() {
        let env = env_of(&[("GOOGLE_API_KEY", "from-env")]);
        assert_eq!(
            resolve_api_key(Some("explicit".into()), env).unwrap(),
            "explicit"
        );
    }

    #[test]
    fn test_builder_rejects_bad_temperature() {
        let result = GeminiProviderBuilder::new()
            .api_key("k")
            .temperature(3.5)
            .build();
        assert!(matches!(result, Err(FeedbackError::Config(_))));
    }

    #[test]
    fn test_builder_trims_base_url() {
        let provider = GeminiProvider::builder()
            .api_key("k")
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(provider.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_request_construction() {
        let gemini_req = GeminiRequest::from_analysis_request(&jpeg_request(), None);

        assert_eq!(gemini_req.contents.len(), 1);
        assert_eq!(gemini_req.contents[0].parts.len(), 2);
        assert!(gemini_req.generation_config.is_none());
    }

    #[test]
    fn test_request_serialization() {
        let gemini_req = GeminiRequest::from_analysis_request(&jpeg_request(), Some(0.4));
        let json = serde_json::to_value(&gemini_req).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert!(parts[0]["text"].as_str().unwrap().contains("Positives:"));
        assert_eq!(parts[1]["inline_data"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "/9j/4A==");

        assert!(json.get("generationConfig").is_some());
        assert!(json.get("generation_config").is_none());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "Positives:\n- A\n"}],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.candidates.len(), 1);
        assert_eq!(resp.candidates[0].finish_reason.as_deref(), Some("STOP"));

        let content = resp.candidates[0].content.as_ref().unwrap();
        assert_eq!(content.parts[0].text.as_deref(), Some("Positives:\n- A\n"));
    }

    #[test]
    fn test_response_with_prompt_feedback_block() {
        let json = r#"{
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(resp.candidates.is_empty());
        let feedback = resp.prompt_feedback.unwrap();
        assert_eq!(feedback.block_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_parse_error_mapping() {
        let provider = GeminiProvider::builder().api_key("k").build().unwrap();
        let headers = reqwest::header::HeaderMap::new();

        assert!(matches!(
            provider.parse_error(403, "denied", &headers),
            FeedbackError::Auth(_)
        ));
        assert!(matches!(
            provider.parse_error(404, "", &headers),
            FeedbackError::InvalidRequest(_)
        ));
        assert!(matches!(
            provider.parse_error(400, "Request blocked by safety settings", &headers),
            FeedbackError::ContentBlocked(_)
        ));
        assert!(matches!(
            provider.parse_error(500, "internal", &headers),
            FeedbackError::Api { status: 500, .. }
        ));
    }
}
