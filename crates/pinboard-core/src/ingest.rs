//! Image ingestion: filtering pasted or dropped content and decoding it into
//! image payloads with a known natural size.

use crate::objects::{ImageFormat, ImagePayload};
use kurbo::Size;
use std::io::Cursor;
use thiserror::Error;

/// Width given to a freshly added image; height follows its aspect ratio.
pub const DEFAULT_IMAGE_WIDTH: f64 = 200.0;

/// Rejected creation input.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Not an image")]
    NotAnImage,
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Empty input")]
    Empty,
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;

/// One item from a paste, a drop, or a file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub bytes: Vec<u8>,
    /// MIME type reported by the host, if any.
    pub mime: Option<String>,
    /// File name, used for logging only.
    pub name: Option<String>,
}

impl ImageSource {
    pub fn new(bytes: Vec<u8>, mime: Option<String>) -> Self {
        Self { bytes, mime, name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Read a file, taking the MIME type from its extension.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: &std::path::Path) -> IngestResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| IngestError::Io(format!("{}: {}", path.display(), e)))?;
        let mime = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .map(|format| format.mime_type().to_string());
        let source = Self::new(bytes, mime);
        Ok(match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => source.with_name(name),
            None => source,
        })
    }

    /// Label for log lines.
    pub fn label(&self) -> &str {
        self.name.as_deref().or(self.mime.as_deref()).unwrap_or("<unnamed>")
    }

    /// Whether this item is image-typed content.
    ///
    /// A reported MIME type decides on its own; without one, the bytes must
    /// start with a recognized image signature.
    pub fn is_image(&self) -> bool {
        match &self.mime {
            Some(mime) => mime.trim().to_ascii_lowercase().starts_with("image/"),
            None => ImageFormat::from_magic_bytes(&self.bytes).is_some(),
        }
    }

    /// Format to decode with: the signature in the bytes wins over the
    /// reported MIME type.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_magic_bytes(&self.bytes).or_else(|| self.mime.as_deref().and_then(ImageFormat::from_mime_type))
    }
}

/// A decoded image ready to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub payload: ImagePayload,
    /// Natural pixel size.
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    /// Natural width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Initial on-canvas size: fixed width, height from the natural aspect.
    pub fn default_size(&self) -> Size {
        Size::new(DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_WIDTH / self.aspect_ratio())
    }
}

/// Keep only the image-typed items of a paste or drop.
pub fn filter_images(items: Vec<ImageSource>) -> Vec<ImageSource> {
    items
        .into_iter()
        .filter(|item| {
            let keep = item.is_image();
            if !keep {
                log::debug!("Ignoring non-image item {}", item.label());
            }
            keep
        })
        .collect()
}

/// Decode an image source into a payload and its natural dimensions.
///
/// Only the header is read to obtain the dimensions; the original bytes are
/// embedded as-is.
pub async fn decode_image(source: ImageSource) -> IngestResult<DecodedImage> {
    if source.bytes.is_empty() {
        return Err(IngestError::Empty);
    }
    if !source.is_image() {
        return Err(IngestError::NotAnImage);
    }
    let format = source
        .format()
        .ok_or_else(|| IngestError::UnsupportedFormat(source.mime.clone().unwrap_or_else(|| "unknown".to_string())))?;

    let (width, height) = image::ImageReader::with_format(Cursor::new(source.bytes.as_slice()), format.to_image_crate())
        .into_dimensions()
        .map_err(|e| IngestError::Decode(e.to_string()))?;
    if width == 0 || height == 0 {
        return Err(IngestError::Decode(format!("zero-sized image {}x{}", width, height)));
    }

    log::debug!("Decoded {} as {:?} {}x{}", source.label(), format, width, height);
    Ok(DecodedImage {
        payload: ImagePayload::from_bytes(&source.bytes, format),
        width,
        height,
    })
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::new(width, height);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}
