//! Categorization of a batch of image paths.
//!
//! Each path is validated, classified by resolution, scored for focus and
//! appended to its category. Files that fail validation are left out
//! without further notice.

use crate::category::{CategoryKey, CategoryMap, ImageRef, Sharpness};
use crate::focus::{FocusFailurePolicy, FocusScorer};
use crate::resolution::ResolutionBucket;
use crate::validator::{self, DecodedImage};
use indicatif::ProgressBar;
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Builds a [`CategoryMap`] from a list of paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct Categorizer {
    scorer: FocusScorer,
    on_focus_error: FocusFailurePolicy,
}

impl Categorizer {
    pub fn new(scorer: FocusScorer, on_focus_error: FocusFailurePolicy) -> Self {
        Self {
            scorer,
            on_focus_error,
        }
    }

    /// Categorizes `paths` in order and returns a fresh map.
    ///
    /// The same ordered input always yields the same map.
    pub fn categorize(&self, paths: &[PathBuf]) -> CategoryMap {
        self.categorize_with_progress(paths, &ProgressBar::hidden())
    }

    /// Like [`Categorizer::categorize`], advancing `progress` once per path.
    pub fn categorize_with_progress(
        &self,
        paths: &[PathBuf],
        progress: &ProgressBar,
    ) -> CategoryMap {
        let mut categories = CategoryMap::new();
        let mut skipped = 0usize;

        for path in paths {
            progress.set_message(display_name(path));
            match self.categorize_one(path) {
                Some((key, image)) => categories.push(key, image),
                None => skipped += 1,
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        debug!(
            "categorized {} image(s) into {} categories, skipped {}",
            categories.image_count(),
            categories.len(),
            skipped
        );
        categories
    }

    /// Classifies a single file, or returns `None` if it is left out.
    pub fn categorize_one(&self, path: &Path) -> Option<(CategoryKey, ImageRef)> {
        let decoded = match validator::validate(path) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!("skipping {}", e);
                return None;
            }
        };

        let bucket = ResolutionBucket::from_dimensions(decoded.width(), decoded.height());
        let (sharpness, focus_variance) = self.assess_focus(path, &decoded)?;

        let image = ImageRef {
            display_name: display_name(path),
            source_path: path.to_path_buf(),
            width: decoded.width(),
            height: decoded.height(),
            format: decoded.format_name(),
            mime_type: decoded.mime_type.clone(),
            focus_variance,
        };
        Some((CategoryKey::new(bucket, sharpness), image))
    }

    fn assess_focus(
        &self,
        path: &Path,
        decoded: &DecodedImage,
    ) -> Option<(Sharpness, Option<f64>)> {
        match self.scorer.variance(&decoded.image) {
            Ok(variance) => {
                let blurry = self.scorer.is_blurry_variance(variance);
                Some((Sharpness::from_blurry(blurry), Some(variance)))
            }
            Err(e) => match self.on_focus_error {
                FocusFailurePolicy::AssumeClear => {
                    warn!(
                        "focus scoring failed for {} ({}); filing it as clear",
                        path.display(),
                        e
                    );
                    Some((Sharpness::Clear, None))
                }
                FocusFailurePolicy::Skip => {
                    warn!("focus scoring failed for {} ({}); skipping", path.display(), e);
                    None
                }
            },
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::fs;
    use tempfile::TempDir;

    fn write_gray(dir: &Path, name: &str, width: u32, height: u32, sharp: bool) -> PathBuf {
        let path = dir.join(name);
        GrayImage::from_fn(width, height, |x, y| {
            if sharp && (x + y) % 2 == 0 {
                Luma([255])
            } else {
                Luma([40])
            }
        })
        .save(&path)
        .expect("Failed to write test image");
        path
    }

    #[test]
    fn test_categorize_mixed_batch() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        let paths = vec![
            write_gray(dir, "wide.png", 1280, 720, true),
            write_gray(dir, "medium.png", 720, 480, false),
            write_gray(dir, "tiny.png", 300, 200, true),
        ];

        let map = Categorizer::default().categorize(&paths);

        let labels: Vec<_> = map.keys().map(|key| key.to_string()).collect();
        assert_eq!(
            labels,
            vec!["720p (Clear)", "480p (Blurry)", "Below 360p (Clear)"]
        );
        for (_, images) in map.iter() {
            assert_eq!(images.len(), 1);
        }
    }

    #[test]
    fn test_non_images_are_left_out() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        let fake = dir.join("fake.jpg");
        fs::write(&fake, "hello").expect("Failed to write file");
        let real = write_gray(dir, "real.png", 10, 10, false);

        let map = Categorizer::default().categorize(&[fake.clone(), real, dir.join("missing.png")]);

        assert_eq!(map.image_count(), 1);
        assert!(map
            .iter()
            .flat_map(|(_, images)| images)
            .all(|image| image.source_path != fake));
    }

    #[test]
    fn test_image_ref_fields() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_gray(temp_dir.path(), "flat.png", 12, 9, false);

        let (key, image) = Categorizer::default()
            .categorize_one(&path)
            .expect("image should be categorized");

        assert_eq!(key.to_string(), "Below 360p (Blurry)");
        assert_eq!(image.display_name, "flat.png");
        assert_eq!(image.source_path, path);
        assert_eq!((image.width, image.height), (12, 9));
        assert_eq!(image.format.as_deref(), Some("png"));
        assert_eq!(image.mime_type.as_deref(), Some("image/png"));
        assert_eq!(image.focus_variance, Some(0.0));
    }

    #[test]
    fn test_threshold_changes_verdict() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_gray(temp_dir.path(), "sharp.png", 16, 16, true);

        let default = Categorizer::default().categorize_one(&path);
        let strict = Categorizer::new(FocusScorer::new(f64::MAX), FocusFailurePolicy::Skip)
            .categorize_one(&path);

        assert_eq!(default.map(|(key, _)| key.sharpness), Some(Sharpness::Clear));
        assert_eq!(strict.map(|(key, _)| key.sharpness), Some(Sharpness::Blurry));
    }

    /// A 0x0 binary PGM decodes fine but has no pixels to score.
    fn write_empty_pgm(dir: &Path) -> PathBuf {
        let path = dir.join("empty.pgm");
        fs::write(&path, b"P5\n0 0\n255\n").expect("Failed to write file");
        path
    }

    #[test]
    fn test_focus_failure_files_image_as_clear() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_empty_pgm(temp_dir.path());

        let (key, image) = Categorizer::new(FocusScorer::default(), FocusFailurePolicy::AssumeClear)
            .categorize_one(&path)
            .expect("image should be kept");

        assert_eq!(key.to_string(), "Below 360p (Clear)");
        assert_eq!((image.width, image.height), (0, 0));
        assert_eq!(image.focus_variance, None);
    }

    #[test]
    fn test_focus_failure_skips_image_when_configured() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_empty_pgm(temp_dir.path());

        let categorizer = Categorizer::new(FocusScorer::default(), FocusFailurePolicy::Skip);
        assert!(categorizer.categorize_one(&path).is_none());
        assert!(categorizer.categorize(&[path]).is_empty());
    }

    #[test]
    fn test_categorize_is_deterministic() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        let paths: Vec<_> = (0..6)
            .map(|i| write_gray(dir, &format!("img_{}.png", i), 20 + i * 100, 30, i % 2 == 0))
            .collect();

        let categorizer = Categorizer::default();
        assert_eq!(categorizer.categorize(&paths), categorizer.categorize(&paths));
    }
}
