use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::EtlError;

/// Recursively collect every file under `root` whose extension is `extension`.
///
/// Returned paths are absolute. Entries are visited in file-name order within
/// each directory, so two runs over the same tree see the same sequence.
pub fn collect_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, EtlError> {
    let root = root
        .canonicalize()
        .map_err(|e| EtlError::io(root, e))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
