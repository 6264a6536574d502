//! Sharpness scoring by Laplacian variance.
//!
//! The image is reduced to 8-bit luma and filtered with the 4-neighbour
//! Laplacian kernel:
//!
//! ```text
//! [ 0,  1,  0 ]
//! [ 1, -4,  1 ]
//! [ 0,  1,  0 ]
//! ```
//!
//! The population variance of the response is the focus measure. Few
//! strong edges mean low variance, which reads as blur. The default
//! threshold of 100 is only meaningful on this kernel and the 0-255 luma
//! scale; it does not carry over to normalised pipelines.

use crate::validator::{self, ValidationError};
use image::{DynamicImage, GrayImage, Luma};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Variance below which an image is considered blurry.
pub const DEFAULT_BLUR_THRESHOLD: f64 = 100.0;

/// Why a focus score could not be computed.
#[derive(Debug, Error)]
pub enum FocusError {
    #[error(transparent)]
    Decode(#[from] ValidationError),
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// What the categorizer does with an image whose focus score failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusFailurePolicy {
    /// File the image as clear. Matches the historical behaviour, although
    /// it hides the failure from the user; a warning is logged instead.
    #[default]
    AssumeClear,
    /// Leave the image out of the results.
    Skip,
}

/// Scores images against a blur threshold.
#[derive(Debug, Clone, Copy)]
pub struct FocusScorer {
    threshold: f64,
}

impl Default for FocusScorer {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_THRESHOLD)
    }
}

impl FocusScorer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Laplacian variance of an already decoded image.
    pub fn variance(&self, image: &DynamicImage) -> Result<f64, FocusError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(FocusError::EmptyImage {
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(laplacian_variance(&to_luma_bt601(image)))
    }

    /// True if `variance` falls below the threshold.
    pub fn is_blurry_variance(&self, variance: f64) -> bool {
        variance < self.threshold
    }

    /// Decodes `path` and reports whether it is blurry.
    ///
    /// # Errors
    ///
    /// Decode failures are returned rather than folded into a verdict, so the
    /// caller picks the policy (see [`FocusFailurePolicy`]).
    pub fn is_blurry(&self, path: &Path) -> Result<bool, FocusError> {
        let decoded = validator::validate(path)?;
        let variance = self.variance(&decoded.image)?;
        Ok(self.is_blurry_variance(variance))
    }
}

/// Converts to 8-bit luma with BT.601 weights in 14-bit fixed point.
///
/// Alpha is discarded and 16-bit or float sources are scaled to 8 bits first.
pub fn to_luma_bt601(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    let mut gray = GrayImage::new(rgb.width(), rgb.height());
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let luma = (u32::from(r) * 4899 + u32::from(g) * 9617 + u32::from(b) * 1868 + 8192) >> 14;
        gray.put_pixel(x, y, Luma([luma as u8]));
    }
    gray
}

/// Population variance of the 3x3 Laplacian response over every pixel.
///
/// Borders are extended by reflect-101 (`dcb|abcd|cba`). Sums are exact
/// integers; only the final division happens in floating point.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let at = |x: i64, y: i64| -> i64 {
        let x = reflect_101(x, width);
        let y = reflect_101(y, height);
        i64::from(gray.get_pixel(x, y).0[0])
    };

    let mut sum: i128 = 0;
    let mut sum_sq: i128 = 0;
    for y in 0..i64::from(height) {
        for x in 0..i64::from(width) {
            let response = at(x, y - 1) + at(x, y + 1) + at(x - 1, y) + at(x + 1, y) - 4 * at(x, y);
            let response = i128::from(response);
            sum += response;
            sum_sq += response * response;
        }
    }

    let count = i128::from(width) * i128::from(height);
    let numerator = count * sum_sq - sum * sum;
    numerator as f64 / (count * count) as f64
}

/// Maps an out-of-range coordinate back inside `0..len` without repeating the edge.
fn reflect_101(index: i64, len: u32) -> u32 {
    let len = i64::from(len);
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i as u32
}
