//! Command dispatch.
//!
//! A [`Session`] owns the result of the latest analysis and applies
//! [`Command`]s to it. Front ends only build commands and render the
//! returned [`Event`]s; they never touch the categorized state directly.

use crate::categorizer::Categorizer;
use crate::category::{CategoryKey, CategoryMap};
use crate::config::{CompiledFilters, Config, ConfigError};
use crate::exporter::{ExportError, ExportReport, Exporter};
use crate::output::OutputFormatter;
use crate::selection::{self, SelectionError};
use indicatif::ProgressBar;
use log::info;
use std::path::PathBuf;
use thiserror::Error;

/// A user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Analyze every file directly inside a folder.
    AnalyzeFolder(PathBuf),
    /// Analyze exactly these files, in this order.
    AnalyzeFiles(Vec<PathBuf>),
    /// Archive one category of the current analysis.
    Export {
        category: CategoryKey,
        destination: PathBuf,
    },
}

/// What a command did.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Analyzed {
        /// Paths considered, including ones that were not images.
        inputs: usize,
        images: usize,
        categories: usize,
    },
    Exported(ExportReport),
    /// Nothing happened, for a reason the user should see.
    Warning(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Holds the current categorization and applies commands to it.
#[derive(Debug)]
pub struct Session {
    categorizer: Categorizer,
    filters: CompiledFilters,
    exporter: Exporter,
    categories: CategoryMap,
    show_progress: bool,
}

impl Session {
    pub fn new(categorizer: Categorizer, filters: CompiledFilters) -> Self {
        Self {
            categorizer,
            filters,
            exporter: Exporter::new(),
            categories: CategoryMap::new(),
            show_progress: false,
        }
    }

    /// Builds a session from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.analysis.categorizer()?,
            config.filters.compile()?,
        ))
    }

    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// Shows a progress bar while analyzing.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Result of the latest analysis; empty before the first one.
    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    /// Applies `command`.
    ///
    /// Analysis replaces the previous result entirely. Exporting a category
    /// that is absent or empty yields [`Event::Warning`] and writes nothing.
    ///
    /// # Errors
    ///
    /// Fails if a folder cannot be listed or an archive cannot be written.
    pub fn dispatch(&mut self, command: Command) -> Result<Event, SessionError> {
        match command {
            Command::AnalyzeFolder(dir) => {
                let paths = selection::folder_images(&dir, &self.filters)?;
                info!("analyzing {} file(s) in {}", paths.len(), dir.display());
                Ok(self.analyze(paths))
            }
            Command::AnalyzeFiles(paths) => {
                info!("analyzing {} selected file(s)", paths.len());
                Ok(self.analyze(paths))
            }
            Command::Export {
                category,
                destination,
            } => match self
                .exporter
                .export(&self.categories, &category, &destination)
            {
                Ok(report) => Ok(Event::Exported(report)),
                Err(e @ ExportError::EmptyCategory(_)) => Ok(Event::Warning(e.to_string())),
                Err(e) => Err(e.into()),
            },
        }
    }

    fn analyze(&mut self, paths: Vec<PathBuf>) -> Event {
        self.categories = CategoryMap::new();

        let progress = if self.show_progress {
            OutputFormatter::create_progress_bar(paths.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        self.categories = self
            .categorizer
            .categorize_with_progress(&paths, &progress);

        Event::Analyzed {
            inputs: paths.len(),
            images: self.categories.image_count(),
            categories: self.categories.len(),
        }
    }
}
