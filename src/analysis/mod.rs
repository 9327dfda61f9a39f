//! Photo analysis through a generative-AI provider.

mod provider;
pub mod providers;
mod types;

pub use provider::{AnalysisProvider, AnalysisProviderExt};
pub use types::{AnalysisRequest, ProviderKind};
