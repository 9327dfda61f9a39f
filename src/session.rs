//! Selection and feedback state for one user.
//!
//! A session remembers the selected image, the language, and the outcome of
//! the last analysis. Only one analysis runs at a time; selecting a new image
//! clears the displayed feedback and discards the result of any analysis
//! still running for the old one.

use crate::analysis::{AnalysisProvider, AnalysisProviderExt, AnalysisRequest};
use crate::error::{FeedbackError, Result};
use crate::feedback::FeedbackResult;
use crate::image::{ImageReference, ImageSelector, Selection};
use crate::language::Language;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct SessionState {
    image: Option<ImageReference>,
    feedback: Option<FeedbackResult>,
    error: Option<String>,
    language: Language,
    /// Bumped on every selection so late results for an old image are dropped.
    generation: u64,
    in_flight: bool,
}

/// Holds the state of the photo feedback screen.
pub struct AnalysisSession<P> {
    provider: P,
    state: Mutex<SessionState>,
}

impl<P: AnalysisProvider> AnalysisSession<P> {
    /// Creates a session with no image selected.
    pub fn new(provider: P, language: Language) -> Self {
        Self {
            provider,
            state: Mutex::new(SessionState {
                language,
                ..SessionState::default()
            }),
        }
    }

    /// Returns the provider used for analysis.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `image` the current image, clearing any feedback or error.
    pub fn select(&self, image: ImageReference) {
        let mut state = self.state();
        tracing::info!(uri = %image.uri, width = image.width, height = image.height, "image selected");
        state.image = Some(image);
        state.feedback = None;
        state.error = None;
        state.generation += 1;
    }

    /// Runs a selection attempt. Returns false if the user cancelled.
    ///
    /// A cancelled or failed attempt leaves the current image in place.
    pub fn select_with(&self, selector: &mut impl ImageSelector) -> Result<bool> {
        match selector.select()? {
            Selection::Chosen(image) => {
                self.select(image);
                Ok(true)
            }
            Selection::Cancelled => Ok(false),
        }
    }

    /// Switches between the two languages and returns the new one.
    pub fn toggle_language(&self) -> Language {
        let mut state = self.state();
        state.language = state.language.toggle();
        state.language
    }

    /// Sets the response language.
    pub fn set_language(&self, language: Language) {
        self.state().language = language;
    }

    /// Returns the current language.
    pub fn language(&self) -> Language {
        self.state().language
    }

    /// Returns the selected image.
    pub fn image(&self) -> Option<ImageReference> {
        self.state().image.clone()
    }

    /// Returns the feedback of the last successful analysis.
    pub fn feedback(&self) -> Option<FeedbackResult> {
        self.state().feedback.clone()
    }

    /// Returns the user-facing message of the last failed analysis.
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Returns true while an analysis is running.
    pub fn is_busy(&self) -> bool {
        self.state().in_flight
    }

    /// Analyzes the selected image.
    ///
    /// Fails with [`FeedbackError::Busy`] while another analysis is running
    /// and with [`FeedbackError::Stale`] if a new image was selected before
    /// this one finished; neither touches the stored feedback. Other failures
    /// clear the feedback and store a localized retry message.
    pub async fn analyze(&self) -> Result<FeedbackResult> {
        let (image, language, generation, _in_flight) = {
            let mut state = self.state();
            if state.in_flight {
                return Err(FeedbackError::Busy);
            }
            let image = state.image.clone().ok_or(FeedbackError::NoImageSelected)?;
            state.in_flight = true;
            state.error = None;
            (image, state.language, state.generation, InFlight(&self.state))
        };

        tracing::info!(uri = %image.uri, language = %language, "analyzing image");
        let outcome = self.run(&image, language).await;

        let mut state = self.state();
        if state.generation != generation {
            tracing::info!("selection changed during analysis, dropping result");
            return Err(FeedbackError::Stale);
        }

        match outcome {
            Ok(feedback) => {
                state.feedback = Some(feedback.clone());
                Ok(feedback)
            }
            Err(e) => {
                tracing::warn!(kind = ?e.kind(), "analysis failed: {e}");
                state.feedback = None;
                state.error = Some(e.user_message(language));
                Err(e)
            }
        }
    }

    async fn run(&self, image: &ImageReference, language: Language) -> Result<FeedbackResult> {
        let payload = image.load().await?;
        let request = AnalysisRequest::new(payload, language);
        self.provider.feedback(&request).await
    }
}

/// Clears the in-flight flag when the analysis ends, however it ends.
struct InFlight<'a>(&'a Mutex<SessionState>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight = false;
    }
}
