//! Image validation.
//!
//! A file counts as an image only if it decodes completely. The container
//! format is sniffed from the file's bytes, so an extension alone proves
//! nothing: a text file renamed to `photo.png` is rejected.

use image::{DynamicImage, ImageError, ImageFormat, ImageReader};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reasons a file failed validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The file could not be opened or read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The bytes are not a supported image, or the image is truncated or corrupt.
    #[error("cannot decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
}

/// A fully decoded image together with what was detected about its container.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    /// Container format detected by the decoder.
    pub format: Option<ImageFormat>,
    /// MIME type sniffed from the file header.
    pub mime_type: Option<String>,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Lowercase name of the detected format, e.g. `png`.
    pub fn format_name(&self) -> Option<String> {
        self.format
            .and_then(|format| format.extensions_str().first().copied())
            .map(str::to_string)
    }
}

/// Decodes `path` completely, returning the pixels on success.
///
/// # Errors
///
/// Returns [`ValidationError::Io`] when the file cannot be opened and
/// [`ValidationError::Decode`] for unsupported, truncated or corrupt data.
pub fn validate(path: &Path) -> Result<DecodedImage, ValidationError> {
    let io_error = |source| ValidationError::Io {
        path: path.to_path_buf(),
        source,
    };

    let reader = ImageReader::open(path)
        .map_err(io_error)?
        .with_guessed_format()
        .map_err(io_error)?;
    let format = reader.format();

    let image = reader.decode().map_err(|source| ValidationError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let mime_type = infer::get_from_path(path)
        .ok()
        .flatten()
        .map(|kind| kind.mime_type().to_string());

    Ok(DecodedImage {
        image,
        format,
        mime_type,
    })
}

/// Returns true if `path` is a decodable image. Never fails.
///
/// ```no_run
/// use imgsort::validator::is_image;
/// use std::path::Path;
///
/// if !is_image(Path::new("notes.png")) {
///     println!("skipping");
/// }
/// ```
pub fn is_image(path: &Path) -> bool {
    validate(path).is_ok()
}
