//! The image-selection facility.

use crate::error::{FeedbackError, Result};
use crate::image::types::{selection_io_error, ImageReference};
use std::path::PathBuf;

/// Outcome of a selection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The user picked an image.
    Chosen(ImageReference),
    /// The user backed out without picking anything.
    Cancelled,
}

/// Source of user-selected images.
pub trait ImageSelector {
    /// Asks for an image. Permission denial is an error; cancellation is not.
    fn select(&mut self) -> Result<Selection>;
}

/// Selects images from the local filesystem.
///
/// Each call to [`ImageSelector::select`] consumes the queued path; with
/// nothing queued the selection counts as cancelled.
#[derive(Debug, Default)]
pub struct PathSelector {
    pending: Option<PathBuf>,
}

impl PathSelector {
    /// Creates a selector with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the path returned by the next selection.
    pub fn choose(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.pending = Some(path.into());
        self
    }
}

impl ImageSelector for PathSelector {
    fn select(&mut self) -> Result<Selection> {
        let Some(path) = self.pending.take() else {
            return Ok(Selection::Cancelled);
        };

        let metadata = std::fs::metadata(&path).map_err(|e| selection_io_error(&path, e))?;
        if !metadata.is_file() {
            return Err(FeedbackError::Selection(format!(
                "{} is not a file",
                path.display()
            )));
        }
        // Opening up front surfaces permission problems at selection time.
        std::fs::File::open(&path).map_err(|e| selection_io_error(&path, e))?;

        let (width, height) = read_dimensions(&path);
        tracing::debug!(path = %path.display(), width, height, "image selected");
        Ok(Selection::Chosen(ImageReference::new(
            path.to_string_lossy(),
            width,
            height,
        )))
    }
}

/// Reads pixel dimensions from the image header; `(0, 0)` when unknown.
fn read_dimensions(path: &std::path::Path) -> (u32, u32) {
    let dimensions = image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(image::ImageError::from)
        .and_then(|reader| reader.into_dimensions());

    match dimensions {
        Ok(dims) => dims,
        Err(e) => {
            tracing::debug!(path = %path.display(), "could not read image dimensions: {e}");
            (0, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1x1 transparent PNG.
    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn test_nothing_queued_is_cancelled() {
        let mut selector = PathSelector::new();
        assert_eq!(selector.select().unwrap(), Selection::Cancelled);
    }

    #[test]
    fn test_selects_file_with_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        std::fs::write(&path, TINY_PNG).unwrap();

        let mut selector = PathSelector::new();
        selector.choose(&path);
        match selector.select().unwrap() {
            Selection::Chosen(reference) => {
                assert_eq!(reference.path(), path);
                assert_eq!((reference.width, reference.height), (1, 1));
            }
            Selection::Cancelled => panic!("expected a chosen image"),
        }

        // The queued path is consumed.
        assert_eq!(selector.select().unwrap(), Selection::Cancelled);
    }

    #[test]
    fn test_unreadable_header_gives_unknown_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-really.jpg");
        std::fs::write(&path, b"plain text, not an image").unwrap();

        let mut selector = PathSelector::new();
        selector.choose(&path);
        let Selection::Chosen(reference) = selector.select().unwrap() else {
            panic!("expected a chosen image");
        };
        assert!(!reference.has_dimensions());
    }

    #[test]
    fn test_missing_file_is_selection_error() {
        let mut selector = PathSelector::new();
        selector.choose("/no/such/photo.jpg");
        assert!(matches!(
            selector.select(),
            Err(FeedbackError::Selection(_))
        ));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut selector = PathSelector::new();
        selector.choose(dir.path());
        assert!(matches!(
            selector.select(),
            Err(FeedbackError::Selection(_))
        ));
    }
}
