//! Core types for selected images.

use crate::error::{FeedbackError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG format, the default for camera photos.
    #[default]
    Jpeg,
    /// PNG format (lossless).
    Png,
    /// WebP format.
    WebP,
    /// GIF format.
    Gif,
    /// HEIC/HEIF, produced by many phone cameras.
    Heic,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Heic => "image/heic",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            "heic" | "heif" => Some(Self::Heic),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }

        // HEIF: ....ftyp<brand>
        if &data[4..8] == b"ftyp"
            && matches!(&data[8..12], b"heic" | b"heix" | b"heim" | b"heis" | b"mif1" | b"msf1")
        {
            return Some(Self::Heic);
        }

        None
    }
}

/// A user-selected image: where it lives and how big it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    /// Locator of the image, a filesystem path or `file://` URI.
    pub uri: String,
    /// Width in pixels, `0` when unknown.
    pub width: u32,
    /// Height in pixels, `0` when unknown.
    pub height: u32,
}

impl ImageReference {
    /// Creates a reference with known dimensions.
    pub fn new(uri: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            uri: uri.into(),
            width,
            height,
        }
    }

    /// Creates a reference whose dimensions are unknown.
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self::new(uri, 0, 0)
    }

    /// Returns true if both dimensions are known.
    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Returns the filesystem path this reference points to.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(self.uri.strip_prefix("file://").unwrap_or(&self.uri))
    }

    /// Reads the image bytes.
    pub async fn load(&self) -> Result<ImagePayload> {
        let path = self.path();
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| selection_io_error(&path, e))?;
        if data.is_empty() {
            return Err(FeedbackError::Selection(format!(
                "{} is empty",
                path.display()
            )));
        }
        let hint = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension);
        let payload = ImagePayload::detect(data, hint);
        tracing::debug!(
            uri = %self.uri,
            bytes = payload.size(),
            mime = payload.format.mime_type(),
            "loaded image"
        );
        Ok(payload)
    }
}

/// Converts an I/O failure on an image path into a selection error.
pub(crate) fn selection_io_error(path: &Path, err: std::io::Error) -> FeedbackError {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => {
            FeedbackError::Selection(format!("permission denied: {}", path.display()))
        }
        std::io::ErrorKind::NotFound => {
            FeedbackError::Selection(format!("no such image: {}", path.display()))
        }
        _ => FeedbackError::Selection(format!("cannot read {}: {err}", path.display())),
    }
}

/// Image bytes ready to be sent inline to the model.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Image format.
    pub format: ImageFormat,
}

impl ImagePayload {
    /// Creates a payload with an explicit format.
    pub fn new(data: Vec<u8>, format: ImageFormat) -> Self {
        Self { data, format }
    }

    /// Creates a payload, detecting the format from magic bytes.
    ///
    /// Unrecognized data is labelled JPEG.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::detect(data, None)
    }

    /// Detects the format from magic bytes, then `hint`, then falls back to JPEG.
    pub fn detect(data: Vec<u8>, hint: Option<ImageFormat>) -> Self {
        let format = ImageFormat::from_magic_bytes(&data)
            .or(hint)
            .unwrap_or_default();
        Self::new(data, format)
    }

    /// Returns the MIME type sent alongside the data.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}
