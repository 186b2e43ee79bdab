//! Local folder listing used when uploading a site bundle.

use crate::error::{StorageError, StorageResult};
use crate::model::FolderFile;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively list the regular files below `dir`.
///
/// Names are relative to `dir`, use `/` as separator and come back sorted.
pub async fn get_folder_files(dir: &Path) -> StorageResult<Vec<FolderFile>> {
    let dir: PathBuf = dir.to_path_buf();
    tokio::task::spawn_blocking(move || walk(&dir))
        .await
        .map_err(|e| StorageError::IoError(std::io::Error::other(e)))?
}

fn walk(dir: &Path) -> StorageResult<Vec<FolderFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| StorageError::InvalidKey(e.to_string()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let size = entry.metadata().map_err(std::io::Error::from)?.len();

        files.push(FolderFile { name, size });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
