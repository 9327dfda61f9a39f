//! Structured feedback and the parser that extracts it from model text.

mod parser;
mod types;

pub use parser::{parse, ParseFailure};
pub use types::FeedbackResult;
