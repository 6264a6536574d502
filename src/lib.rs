//! imgsort - sort images by resolution and sharpness
//!
//! This library validates image files, scores their sharpness by Laplacian
//! variance, buckets them by pixel count, groups them into categories such
//! as `"1080p (Clear)"`, and exports any category as a ZIP archive.

pub mod categorizer;
pub mod category;
pub mod cli;
pub mod config;
pub mod exporter;
pub mod focus;
pub mod logger;
pub mod output;
pub mod resolution;
pub mod selection;
pub mod session;
pub mod validator;

pub use categorizer::Categorizer;
pub use category::{CategoryKey, CategoryMap, ImageRef, Sharpness};
pub use config::{CompiledFilters, Config, ConfigError};
pub use exporter::{ExportError, ExportReport, Exporter, export_category};
pub use focus::{FocusError, FocusFailurePolicy, FocusScorer};
pub use resolution::ResolutionBucket;
pub use session::{Command, Event, Session, SessionError};
pub use validator::{ValidationError, is_image};
