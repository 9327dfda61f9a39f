#![warn(missing_docs)]
//! Photo Feedback - AI critique of photos.
//!
//! Send a photo to a multimodal model and get back what works well in it and
//! what could be improved, in English or Hebrew.
//!
//! # Quick Start
//!
//! Requires the `gemini` feature (on by default).
//!
//! ```no_run
//! # #[cfg(feature = "gemini")]
//! use photo_feedback::{AnalysisProviderExt, AnalysisRequest, GeminiProvider, ImageReference, Language};
//!
//! # #[cfg(feature = "gemini")]
//! #[tokio::main]
//! async fn main() -> photo_feedback::Result<()> {
//!     let provider = GeminiProvider::builder().build()?;
//!     let payload = ImageReference::from_uri("beach.jpg").load().await?;
//!     let request = AnalysisRequest::new(payload, Language::En);
//!     let feedback = provider.feedback(&request).await?;
//!     for item in &feedback.positives {
//!         println!("+ {item}");
//!     }
//!     Ok(())
//! }
//! # #[cfg(not(feature = "gemini"))]
//! # fn main() {}
//! ```
//!
//! # Parsing only
//!
//! [`parse`] is a pure function and needs no network access:
//!
//! ```
//! let result = photo_feedback::parse("Positives:\n- A\n- B\n\nSuggestions:\n- C\n").unwrap();
//! assert_eq!(result.positives, ["A", "B"]);
//! assert_eq!(result.suggestions, ["C"]);
//! ```
//!
//! # Features
//!
//! - `gemini`: Gemini (Google) provider
//! - `cli`: Command-line interface

pub mod analysis;
mod error;
pub mod feedback;
pub mod image;
mod language;
pub mod prompt;
mod session;

pub use error::{ErrorKind, FeedbackError, Result};

pub use analysis::{AnalysisProvider, AnalysisProviderExt, AnalysisRequest, ProviderKind};
pub use feedback::{parse, FeedbackResult, ParseFailure};
pub use image::{ImageFormat, ImagePayload, ImageReference, ImageSelector, PathSelector, Selection};
pub use language::{Language, TextDirection};
pub use session::AnalysisSession;

#[cfg(feature = "gemini")]
pub use analysis::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::analysis::{AnalysisProvider, AnalysisProviderExt, AnalysisRequest};
    pub use crate::error::{FeedbackError, Result};
    pub use crate::feedback::{parse, FeedbackResult};
    pub use crate::image::ImageReference;
    pub use crate::language::Language;
    pub use crate::session::AnalysisSession;

    #[cfg(feature = "gemini")]
    pub use crate::analysis::providers::GeminiProvider;
}
