//! ZIP export of a single category.
//!
//! The category's files are first copied into a private staging directory
//! under a folder named after the category, then that folder is archived.
//! The archive is written next to its destination under a temporary name
//! and only renamed into place once complete, so a failed export never
//! leaves a partial ZIP behind. The staging directory is removed on every
//! exit path.

use crate::category::{CategoryKey, CategoryMap, ImageRef};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile, TempDir};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Errors that can occur while exporting a category.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export; no file was written.
    #[error("No images in {0}")]
    EmptyCategory(CategoryKey),
    #[error("cannot create staging directory: {0}")]
    Staging(#[source] io::Error),
    #[error("cannot copy {}: {source}", .path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write archive {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write archive {}: {source}", .path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// What an export produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub category: CategoryKey,
    /// Final location of the archive.
    pub destination: PathBuf,
    /// File names stored under the category folder, in archive order.
    pub entries: Vec<String>,
}

/// Exports categories as ZIP archives.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    staging_root: Option<PathBuf>,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates staging directories inside `root` instead of the system temp dir.
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    /// Archives every image of `category` into a ZIP at `destination`.
    ///
    /// The archive holds one top-level folder named after the category with
    /// unmodified copies of the source files. A destination without an
    /// extension gets `.zip` appended; a directory destination receives
    /// `<category>.zip` inside it.
    ///
    /// # Errors
    ///
    /// * [`ExportError::EmptyCategory`] if the category is absent or empty;
    ///   nothing is touched on disk in that case
    /// * [`ExportError::Copy`] if any source file cannot be copied; the
    ///   export is abandoned as a whole
    /// * [`ExportError::Write`] / [`ExportError::Zip`] if the archive cannot
    ///   be written to its destination
    pub fn export(
        &self,
        categories: &CategoryMap,
        category: &CategoryKey,
        destination: &Path,
    ) -> ExportResult<ExportReport> {
        let images = match categories.get(category) {
            Some(images) if !images.is_empty() => images,
            _ => return Err(ExportError::EmptyCategory(*category)),
        };
        let destination = resolve_destination(destination, category);
        let folder_name = category.to_string();

        let staging = self.staging_dir()?;
        debug!("staging {} in {}", folder_name, staging.path().display());
        let category_dir = staging.path().join(&folder_name);
        fs::create_dir(&category_dir).map_err(ExportError::Staging)?;

        let entries = stage_files(images, &category_dir)?;
        write_archive(&category_dir, &folder_name, &entries, &destination)?;

        if let Err(e) = staging.close() {
            warn!("could not remove staging directory: {}", e);
        }

        info!(
            "exported {} file(s) from {} to {}",
            entries.len(),
            folder_name,
            destination.display()
        );
        Ok(ExportReport {
            category: *category,
            destination,
            entries,
        })
    }

    fn staging_dir(&self) -> ExportResult<TempDir> {
        let mut builder = Builder::new();
        builder.prefix("imgsort-staging-");
        let staging = match &self.staging_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        staging.map_err(ExportError::Staging)
    }
}

/// Exports `category` with a default [`Exporter`].
pub fn export_category(
    categories: &CategoryMap,
    category: &CategoryKey,
    destination: &Path,
) -> ExportResult<ExportReport> {
    Exporter::new().export(categories, category, destination)
}

/// `<category>.zip` in the current directory.
pub fn default_destination(category: &CategoryKey) -> PathBuf {
    PathBuf::from(format!("{}.zip", category))
}

/// Where an export to `destination` actually lands.
///
/// An existing directory, or a path ending in a separator, gets
/// [`default_destination`] joined onto it. Anything else goes through
/// [`with_zip_extension`].
pub fn resolve_destination(destination: &Path, category: &CategoryKey) -> PathBuf {
    let names_directory = destination
        .as_os_str()
        .to_string_lossy()
        .ends_with(std::path::is_separator);
    if names_directory || destination.is_dir() {
        return destination.join(default_destination(category));
    }
    with_zip_extension(destination)
}

/// Appends `.zip` when `path` has no extension.
pub fn with_zip_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        return path.to_path_buf();
    }
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".zip");
    PathBuf::from(name)
}

/// Copies every image into `category_dir`, returning the stored names.
fn stage_files(images: &[ImageRef], category_dir: &Path) -> ExportResult<Vec<String>> {
    let mut taken = HashSet::new();
    let mut entries = Vec::with_capacity(images.len());

    for image in images {
        let name = unique_name(&image.display_name, &mut taken);
        fs::copy(&image.source_path, category_dir.join(&name)).map_err(|source| {
            ExportError::Copy {
                path: image.source_path.clone(),
                source,
            }
        })?;
        entries.push(name);
    }
    Ok(entries)
}

/// Picks `name`, or `stem (2).ext`, `stem (3).ext`, ... if already used.
fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 2;
    loop {
        let candidate = format!("{} ({}){}", stem, counter, extension);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

fn write_archive(
    category_dir: &Path,
    folder_name: &str,
    entries: &[String],
    destination: &Path,
) -> ExportResult<()> {
    let write_error = |source| ExportError::Write {
        path: destination.to_path_buf(),
        source,
    };
    let zip_error = |source| ExportError::Zip {
        path: destination.to_path_buf(),
        source,
    };

    let parent = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let partial = NamedTempFile::new_in(parent).map_err(write_error)?;

    let mut zip = ZipWriter::new(partial.as_file());
    zip.add_directory(format!("{}/", folder_name), entry_options(false))
        .map_err(zip_error)?;

    for name in entries {
        let staged = category_dir.join(name);
        let mut file = File::open(&staged).map_err(write_error)?;
        let size = file.metadata().map_err(write_error)?.len();

        zip.start_file(
            format!("{}/{}", folder_name, name),
            entry_options(size >= u64::from(u32::MAX)),
        )
        .map_err(zip_error)?;
        io::copy(&mut file, &mut zip).map_err(write_error)?;
    }
    zip.finish().map_err(zip_error)?;

    partial
        .persist(destination)
        .map_err(|e| write_error(e.error))?;
    Ok(())
}

fn entry_options(large_file: bool) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(large_file)
}
