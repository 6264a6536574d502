//! Terminal presentation of analysis results.
//!
//! All user-facing output goes through [`OutputFormatter`], so the CLI never
//! formats categories itself. Diagnostics go through `log` instead.

use crate::category::{CategoryMap, ImageRef};
use crate::exporter::ExportReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Renders messages, progress and categorized results.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars while analyzing
/// - Category listings, summary tables and JSON
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imgsort::output::OutputFormatter;
    /// OutputFormatter::success("Archive written");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red to stderr.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imgsort::output::OutputFormatter;
    /// OutputFormatter::error("Error exporting 1080p (Clear)");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imgsort::output::OutputFormatter;
    /// OutputFormatter::warning("No images in 720p (Blurry)");
    /// ```
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    ///
    /// # Arguments
    ///
    /// * `header` - The header text
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for `total` files.
    ///
    /// # Arguments
    ///
    /// * `total` - Number of files to analyze
    ///
    /// # Returns
    ///
    /// A configured `ProgressBar` ready for use.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imgsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints every category in display order, one line per image.
    ///
    /// An empty map prints a single "No valid images found" warning.
    ///
    /// # Arguments
    ///
    /// * `categories` - Result of the latest analysis
    pub fn categories(categories: &CategoryMap) {
        if categories.is_empty() {
            Self::warning("No valid images found");
            return;
        }

        for (key, images) in categories.sorted_for_display() {
            Self::header(&format!(
                "{} {}",
                key,
                format!("({})", count_label(images.len())).dimmed()
            ));
            for image in images {
                println!("  {}", Self::image_line(image));
            }
        }
    }

    /// One-line description of an image: name, dimensions, type and focus score.
    ///
    /// # Arguments
    ///
    /// * `image` - The categorized image to describe
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imgsort::category::ImageRef;
    /// use imgsort::output::OutputFormatter;
    /// use std::path::PathBuf;
    ///
    /// let image = ImageRef {
    ///     display_name: "beach.jpg".to_string(),
    ///     source_path: PathBuf::from("beach.jpg"),
    ///     width: 1920,
    ///     height: 1080,
    ///     format: Some("jpg".to_string()),
    ///     mime_type: Some("image/jpeg".to_string()),
    ///     focus_variance: Some(312.4),
    /// };
    /// println!("{}", OutputFormatter::image_line(&image));
    /// ```
    pub fn image_line(image: &ImageRef) -> String {
        let focus = match image.focus_variance {
            Some(variance) => format!("focus {:.1}", variance),
            None => "focus n/a".to_string(),
        };
        format!(
            "{:<40} {:>5}x{:<5} {:<12} {}",
            image.display_name,
            image.width,
            image.height,
            image.mime_type.as_deref().unwrap_or("unknown"),
            focus.dimmed()
        )
    }

    /// Prints a table of image counts per category, in display order.
    ///
    /// # Arguments
    ///
    /// * `categories` - Result of the latest analysis
    pub fn summary_table(categories: &CategoryMap) {
        Self::header("SUMMARY");

        let rows: Vec<(String, usize)> = categories
            .sorted_for_display()
            .into_iter()
            .map(|(key, images)| (key.to_string(), images.len()))
            .collect();

        let width = rows
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8); // At least "Category" width

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Images".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 12));
        for (name, count) in &rows {
            println!(
                "{:<width$} | {}",
                name,
                count_label(*count).green(),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 12));
        println!(
            "{:<width$} | {}",
            "Total".bold(),
            count_label(categories.image_count()).green().bold(),
            width = width
        );
    }

    /// Pretty JSON rendering of the categories in display order.
    ///
    /// # Returns
    ///
    /// A list of `{"category", "images"}` objects, or the serializer error.
    pub fn categories_json(categories: &CategoryMap) -> serde_json::Result<String> {
        serde_json::to_string_pretty(categories)
    }

    /// Prints where an exported category was saved.
    ///
    /// # Arguments
    ///
    /// * `report` - The result of a successful export
    pub fn export_report(report: &ExportReport) {
        Self::success(&format!(
            "{} saved as {} ({})",
            report.category,
            report.destination.display(),
            count_label(report.entries.len())
        ));
    }
}

fn count_label(count: usize) -> String {
    format!("{} {}", count, if count == 1 { "image" } else { "images" })
}
