//! Selected images and the payload sent to the model.

mod selection;
mod types;

pub use selection::{ImageSelector, PathSelector, Selection};
pub use types::{ImageFormat, ImagePayload, ImageReference};
