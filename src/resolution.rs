//! Resolution bucketing by total pixel count.
//!
//! Each bucket is bounded above by the pixel count of the next tier's
//! reference frame, so a 480x360 image is already `360p` while anything
//! with fewer pixels is `Below 360p`.
//!
//! ```
//! use imgsort::resolution::ResolutionBucket;
//!
//! assert_eq!(ResolutionBucket::from_dimensions(1920, 1080), ResolutionBucket::P1080);
//! assert_eq!(ResolutionBucket::from_dimensions(300, 200).label(), "Below 360p");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel-count resolution bucket, declared from highest to lowest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionBucket {
    /// 3840x2160 pixels or more.
    #[serde(rename = "4K or above")]
    Uhd4K,
    #[serde(rename = "1440p")]
    P1440,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "360p")]
    P360,
    /// Fewer pixels than 480x360.
    #[serde(rename = "Below 360p")]
    Below360,
}

/// Lower bounds (inclusive) in pixels, checked from the lowest tier up.
const TIER_FLOORS: [(u64, ResolutionBucket); 6] = [
    (480 * 360, ResolutionBucket::P360),
    (720 * 480, ResolutionBucket::P480),
    (1280 * 720, ResolutionBucket::P720),
    (1920 * 1080, ResolutionBucket::P1080),
    (2560 * 1440, ResolutionBucket::P1440),
    (3840 * 2160, ResolutionBucket::Uhd4K),
];

impl ResolutionBucket {
    /// All buckets from highest to lowest resolution.
    pub const ALL: [ResolutionBucket; 7] = [
        ResolutionBucket::Uhd4K,
        ResolutionBucket::P1440,
        ResolutionBucket::P1080,
        ResolutionBucket::P720,
        ResolutionBucket::P480,
        ResolutionBucket::P360,
        ResolutionBucket::Below360,
    ];

    /// Classifies an image by its total pixel count.
    ///
    /// Total over every `(width, height)` pair; the product is taken in
    /// `u64` so it cannot overflow.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        Self::from_pixel_count(u64::from(width) * u64::from(height))
    }

    /// Classifies a raw pixel count.
    pub fn from_pixel_count(pixels: u64) -> Self {
        TIER_FLOORS
            .iter()
            .rev()
            .find(|(floor, _)| pixels >= *floor)
            .map(|(_, bucket)| *bucket)
            .unwrap_or(ResolutionBucket::Below360)
    }

    /// Human-readable bucket name, as used in category keys.
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionBucket::Uhd4K => "4K or above",
            ResolutionBucket::P1440 => "1440p",
            ResolutionBucket::P1080 => "1080p",
            ResolutionBucket::P720 => "720p",
            ResolutionBucket::P480 => "480p",
            ResolutionBucket::P360 => "360p",
            ResolutionBucket::Below360 => "Below 360p",
        }
    }

    /// Looks a bucket up by its label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.label() == label)
    }

    /// Position in [`ResolutionBucket::ALL`]; 0 is the highest tier.
    pub fn rank(&self) -> usize {
        Self::ALL
            .iter()
            .position(|bucket| bucket == self)
            .unwrap_or(Self::ALL.len())
    }
}

impl fmt::Display for ResolutionBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
