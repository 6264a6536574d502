//! Turning a folder or a list of files into the ordered input of a run.

use crate::config::CompiledFilters;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("cannot read folder {}: {source}", .path.display())]
    UnreadableFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Regular files directly inside `dir` that pass `filters`, sorted by name.
///
/// Subdirectories are not descended into. Entries whose type cannot be
/// determined are skipped.
///
/// # Errors
///
/// Returns [`SelectionError::UnreadableFolder`] if `dir` cannot be listed.
pub fn folder_images(dir: &Path, filters: &CompiledFilters) -> Result<Vec<PathBuf>, SelectionError> {
    let entries = fs::read_dir(dir).map_err(|source| SelectionError::UnreadableFolder {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|file_type| file_type.is_file()))
        .map(|entry| entry.path())
        .filter(|path| filters.should_include(path))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// The user's own file list, kept as given.
pub fn explicit_files<I, P>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    paths.into_iter().map(Into::into).collect()
}
