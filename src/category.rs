//! Category keys and the grouped result of an analysis run.
//!
//! A category is a resolution bucket paired with a sharpness verdict and is
//! written as `"<bucket> (<verdict>)"`, for example `"1080p (Clear)"`.
//!
//! ```
//! use imgsort::category::{CategoryKey, Sharpness};
//! use imgsort::resolution::ResolutionBucket;
//!
//! let key = CategoryKey::new(ResolutionBucket::P720, Sharpness::Blurry);
//! assert_eq!(key.to_string(), "720p (Blurry)");
//! assert_eq!("720p (Blurry)".parse::<CategoryKey>().unwrap(), key);
//! ```

use crate::resolution::ResolutionBucket;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Sharpness verdict. Clear sorts before Blurry within a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sharpness {
    Clear,
    Blurry,
}

impl Sharpness {
    pub fn from_blurry(blurry: bool) -> Self {
        if blurry {
            Sharpness::Blurry
        } else {
            Sharpness::Clear
        }
    }

    /// Suffix appended to the bucket name, parentheses included.
    pub fn suffix(&self) -> &'static str {
        match self {
            Sharpness::Clear => "(Clear)",
            Sharpness::Blurry => "(Blurry)",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "(Clear)" => Some(Sharpness::Clear),
            "(Blurry)" => Some(Sharpness::Blurry),
            _ => None,
        }
    }
}

/// Composite label of resolution bucket and sharpness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryKey {
    pub bucket: ResolutionBucket,
    pub sharpness: Sharpness,
}

impl CategoryKey {
    pub fn new(bucket: ResolutionBucket, sharpness: Sharpness) -> Self {
        Self { bucket, sharpness }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.bucket.label(), self.sharpness.suffix())
    }
}

impl Serialize for CategoryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The string did not name a known category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category '{0}': expected e.g. \"1080p (Clear)\" or \"Below 360p (Blurry)\"")]
pub struct ParseCategoryKeyError(pub String);

impl FromStr for CategoryKey {
    type Err = ParseCategoryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let error = || ParseCategoryKeyError(s.to_string());
        let (bucket, suffix) = trimmed.rsplit_once(' ').ok_or_else(error)?;
        let bucket = ResolutionBucket::from_label(bucket.trim_end()).ok_or_else(error)?;
        let sharpness = Sharpness::from_suffix(suffix).ok_or_else(error)?;
        Ok(CategoryKey::new(bucket, sharpness))
    }
}

/// Every category label in display priority: highest resolution first,
/// Clear before Blurry.
pub fn display_order() -> Vec<String> {
    ResolutionBucket::ALL
        .iter()
        .flat_map(|bucket| {
            [Sharpness::Clear, Sharpness::Blurry]
                .map(|sharpness| CategoryKey::new(*bucket, sharpness).to_string())
        })
        .collect()
}

/// Position of `label` in [`display_order`]; unknown labels rank last.
pub fn display_rank(label: &str) -> usize {
    let order = display_order();
    order
        .iter()
        .position(|known| known == label)
        .unwrap_or(order.len())
}

/// An image that made it into a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRef {
    /// File name shown to the user.
    pub display_name: String,
    /// Path the image was read from.
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Lowercase container format, e.g. `jpg`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// MIME type sniffed from the file header, e.g. `image/jpeg`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Laplacian variance, absent when scoring failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_variance: Option<f64>,
}

/// Images grouped by category.
///
/// Both the category order and the order inside each category follow the
/// order in which images were added, so the same input always produces the
/// same map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMap {
    groups: Vec<(CategoryKey, Vec<ImageRef>)>,
    index: HashMap<CategoryKey, usize>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `image` to `key`, creating the category on first use.
    pub fn push(&mut self, key: CategoryKey, image: ImageRef) {
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].1.push(image),
            None => {
                self.index.insert(key, self.groups.len());
                self.groups.push((key, vec![image]));
            }
        }
    }

    /// Images filed under `key`, if the category exists.
    pub fn get(&self, key: &CategoryKey) -> Option<&[ImageRef]> {
        self.index
            .get(key)
            .map(|&slot| self.groups[slot].1.as_slice())
    }

    /// Categories in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&CategoryKey, &[ImageRef])> {
        self.groups
            .iter()
            .map(|(key, images)| (key, images.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &CategoryKey> {
        self.groups.iter().map(|(key, _)| key)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of images across all categories.
    pub fn image_count(&self) -> usize {
        self.groups.iter().map(|(_, images)| images.len()).sum()
    }

    /// Categories sorted by [`display_rank`]. The sort is stable, so
    /// categories with equal rank keep their insertion order.
    pub fn sorted_for_display(&self) -> Vec<(&CategoryKey, &[ImageRef])> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by_key(|(key, _)| display_rank(&key.to_string()));
        sorted
    }
}

impl Serialize for CategoryMap {
    /// Serializes as a list of `{category, images}` objects in display order.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Group<'a> {
            category: &'a CategoryKey,
            images: &'a [ImageRef],
        }

        serializer.collect_seq(
            self.sorted_for_display()
                .into_iter()
                .map(|(category, images)| Group { category, images }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> ImageRef {
        ImageRef {
            display_name: name.to_string(),
            source_path: PathBuf::from("/photos").join(name),
            width: 10,
            height: 10,
            format: None,
            mime_type: None,
            focus_variance: None,
        }
    }

    #[test]
    fn test_key_formatting() {
        let key = CategoryKey::new(ResolutionBucket::Uhd4K, Sharpness::Clear);
        assert_eq!(key.to_string(), "4K or above (Clear)");
        let key = CategoryKey::new(ResolutionBucket::Below360, Sharpness::Blurry);
        assert_eq!(key.to_string(), "Below 360p (Blurry)");
    }

    #[test]
    fn test_key_parsing() {
        for label in display_order() {
            let key: CategoryKey = label.parse().expect("known label should parse");
            assert_eq!(key.to_string(), label);
        }
        assert!("1080p".parse::<CategoryKey>().is_err());
        assert!("1080p (Fuzzy)".parse::<CategoryKey>().is_err());
        assert!("8K (Clear)".parse::<CategoryKey>().is_err());
        assert_eq!(
            "  480p (Clear) ".parse::<CategoryKey>(),
            Ok(CategoryKey::new(ResolutionBucket::P480, Sharpness::Clear))
        );
    }

    #[test]
    fn test_display_order() {
        let order = display_order();
        assert_eq!(order.len(), 14);
        assert_eq!(order[0], "4K or above (Clear)");
        assert_eq!(order[1], "4K or above (Blurry)");
        assert_eq!(order[2], "1440p (Clear)");
        assert_eq!(order[13], "Below 360p (Blurry)");
        assert_eq!(display_rank("Mystery"), 14);
    }

    #[test]
    fn test_map_preserves_insertion_order() {
        let low = CategoryKey::new(ResolutionBucket::Below360, Sharpness::Clear);
        let high = CategoryKey::new(ResolutionBucket::P1080, Sharpness::Blurry);

        let mut map = CategoryMap::new();
        map.push(low, image("a.png"));
        map.push(high, image("b.png"));
        map.push(low, image("c.png"));

        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![low, high]);
        let names: Vec<_> = map
            .get(&low)
            .expect("category should exist")
            .iter()
            .map(|img| img.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.png", "c.png"]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.image_count(), 3);
    }

    #[test]
    fn test_sorted_for_display() {
        let mut map = CategoryMap::new();
        map.push(
            CategoryKey::new(ResolutionBucket::Below360, Sharpness::Clear),
            image("small.png"),
        );
        map.push(
            CategoryKey::new(ResolutionBucket::P720, Sharpness::Blurry),
            image("soft.png"),
        );
        map.push(
            CategoryKey::new(ResolutionBucket::P720, Sharpness::Clear),
            image("crisp.png"),
        );

        let labels: Vec<_> = map
            .sorted_for_display()
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect();
        assert_eq!(
            labels,
            vec!["720p (Clear)", "720p (Blurry)", "Below 360p (Clear)"]
        );
    }

    #[test]
    fn test_absent_category() {
        let map = CategoryMap::new();
        assert!(map.is_empty());
        assert!(map
            .get(&CategoryKey::new(ResolutionBucket::P360, Sharpness::Clear))
            .is_none());
    }

    #[test]
    fn test_json_shape() {
        let mut map = CategoryMap::new();
        map.push(
            CategoryKey::new(ResolutionBucket::P480, Sharpness::Clear),
            image("x.png"),
        );
        let json = serde_json::to_value(&map).expect("map should serialize");
        assert_eq!(json[0]["category"], "480p (Clear)");
        assert_eq!(json[0]["images"][0]["display_name"], "x.png");
        assert!(json[0]["images"][0].get("focus_variance").is_none());
    }
}
