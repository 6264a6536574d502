//! Configuration loading.
//!
//! Settings come from a TOML file with two tables: `[analysis]` tunes the
//! categorizer and `[filters]` decides which files a folder scan picks up.
//!
//! ```toml
//! [analysis]
//! blur_threshold = 100.0
//! on_focus_error = "assume-clear"   # or "skip"
//!
//! [filters]
//! enable_hidden_files = true   # false skips names starting with "."
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.tmp", "**/cache/**"]
//! extensions = ["txt", "json"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```
//!
//! Explicitly listed files are never filtered; the rules only apply when a
//! whole folder is selected.

use crate::focus::{DEFAULT_BLUR_THRESHOLD, FocusFailurePolicy, FocusScorer};
use crate::categorizer::Categorizer;
use glob::Pattern;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".imgsortrc.toml";

/// Errors raised while loading or compiling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid glob pattern '{0}': expected e.g. *.tmp or cache/**")]
    InvalidGlobPattern(String),
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
    #[error("blur threshold must be a finite, non-negative number, got {0}")]
    InvalidThreshold(f64),
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSettings,
    pub filters: FilterRules,
}

/// Categorizer tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Laplacian variance below which an image is blurry.
    pub blur_threshold: f64,
    pub on_focus_error: FocusFailurePolicy,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            blur_threshold: DEFAULT_BLUR_THRESHOLD,
            on_focus_error: FocusFailurePolicy::default(),
        }
    }
}

impl AnalysisSettings {
    /// Builds the categorizer these settings describe.
    ///
    /// # Errors
    ///
    /// Rejects a negative, NaN or infinite threshold.
    pub fn categorizer(&self) -> Result<Categorizer, ConfigError> {
        if !self.blur_threshold.is_finite() || self.blur_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.blur_threshold));
        }
        Ok(Categorizer::new(
            FocusScorer::new(self.blur_threshold),
            self.on_focus_error,
        ))
    }
}

/// Folder-scan filter rules.
///
/// The defaults pass every file through, so only validation decides what
/// a folder scan keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// Whether files starting with "." are scanned.
    pub enable_hidden_files: bool,
    pub exclude: ExcludeRules,
    /// Whitelist that wins over every exclude rule.
    pub include: IncludeRules,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcludeRules {
    pub filenames: Vec<String>,
    pub patterns: Vec<String>,
    /// Matched case-insensitively, without the leading dot.
    pub extensions: Vec<String>,
    /// Matched against the file name only.
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludeRules {
    pub patterns: Vec<String>,
}

impl Config {
    /// Loads configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if given (it must exist)
    /// 2. `.imgsortrc.toml` in the current directory
    /// 3. `~/.config/imgsort/config.toml`
    /// 4. built-in defaults
    ///
    /// # Errors
    ///
    /// Fails if the chosen file cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("imgsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Loads configuration from exactly `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - The TOML file to read
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] if the file is missing, [`ConfigError::Io`]
    /// if it cannot be read and [`ConfigError::Invalid`] if it does not parse.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        debug!("loading configuration from {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses configuration text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

impl FilterRules {
    /// Compiles every pattern up front.
    ///
    /// # Returns
    ///
    /// A [`CompiledFilters`] ready for [`CompiledFilters::should_include`].
    ///
    /// # Example
    ///
    /// ```
    /// use imgsort::config::Config;
    /// use std::path::Path;
    ///
    /// let config = Config::from_toml("[filters.exclude]\nextensions = [\"txt\"]\n").unwrap();
    /// let filters = config.filters.compile().unwrap();
    /// assert!(!filters.should_include(Path::new("notes.txt")));
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on the first invalid glob or regex.
    pub fn compile(&self) -> Result<CompiledFilters, ConfigError> {
        let exclude_regexes = self
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledFilters {
            enable_hidden_files: self.enable_hidden_files,
            exclude_filenames: self.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: self
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(&self.exclude.patterns)?,
            exclude_regexes,
            include_patterns: compile_globs(&self.include.patterns)?,
        })
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

/// Filter rules with every pattern pre-compiled.
///
/// The default lets every file through.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

impl CompiledFilters {
    /// Decides whether a folder scan should pick up `file_path`.
    ///
    /// Rules are checked in this order:
    /// 1. Include patterns: a match keeps the file, skipping every other rule
    /// 2. Hidden files: dropped only when `enable_hidden_files` is off
    /// 3. Excluded file names
    /// 4. Excluded extensions (case-insensitive)
    /// 5. Excluded glob patterns
    /// 6. Excluded regexes, matched against the file name
    ///
    /// # Arguments
    ///
    /// * `file_path` - Path of the candidate file
    ///
    /// # Returns
    ///
    /// `true` if the file should be handed to the categorizer
    ///
    /// # Example
    ///
    /// ```
    /// use imgsort::config::FilterRules;
    /// use std::path::Path;
    ///
    /// let filters = FilterRules::default().compile().unwrap();
    /// assert!(filters.should_include(Path::new(".cover.png")));
    /// ```
    pub fn should_include(&self, file_path: &Path) -> bool {
        // 1. Include patterns
        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(file_path))
        {
            return true;
        }

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        // 2. Hidden files
        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }
        // 3. File names
        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }
        // 4. Extensions
        if let Some(ext) = file_path.extension()
            && self
                .exclude_extensions
                .contains(&ext.to_string_lossy().to_lowercase())
        {
            return false;
        }
        // 5. Glob patterns
        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(file_path))
        {
            return false;
        }
        // 6. Regexes
        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}
