//! Analysis provider trait and utilities.

use crate::analysis::types::{AnalysisRequest, ProviderKind};
use crate::error::Result;
use crate::feedback::{self, FeedbackResult};
use async_trait::async_trait;

/// Trait for generative-AI services that critique a photo.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Sends the prompt and image, returning the model's raw text.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String>;

    /// Returns the kind of this provider.
    fn kind(&self) -> ProviderKind;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        match self.kind() {
            ProviderKind::Gemini => "Gemini (Google)",
        }
    }

    /// Checks if the provider is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}

/// Extension trait turning raw provider output into feedback.
#[async_trait]
pub trait AnalysisProviderExt: AnalysisProvider {
    /// Analyzes the photo and parses the response.
    ///
    /// Fails with [`FeedbackError::EmptyAnalysis`](crate::FeedbackError::EmptyAnalysis)
    /// when the response has headers but no items. Never retries.
    async fn feedback(&self, request: &AnalysisRequest) -> Result<FeedbackResult> {
        let raw = self.analyze(request).await?;
        let result = feedback::parse(&raw).inspect_err(|e| {
            tracing::warn!(provider = %self.kind(), "discarding model response: {e}");
        })?;
        tracing::debug!(
            positives = result.positives.len(),
            suggestions = result.suggestions.len(),
            "parsed feedback"
        );
        result.non_empty()
    }
}

impl<T: AnalysisProvider + ?Sized> AnalysisProviderExt for T {}
