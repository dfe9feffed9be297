use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::PartsError;

pub fn files_with_extensions(
    dir: &Utf8Path,
    extensions: &[&str],
) -> Result<Vec<Utf8PathBuf>, PartsError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = dir
        .read_dir_utf8()
        .map_err(|err| PartsError::Filesystem(format!("read {dir}: {err}")))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| PartsError::Filesystem(err.to_string()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path
            .extension()
            .map(|ext| extensions.contains(&ext))
            .unwrap_or(false)
        {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), PartsError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| PartsError::Filesystem(err.to_string()))?;
    let mut temp = tempfile::Builder::new()
        .prefix("parts-import")
        .tempfile_in(parent)
        .map_err(|err| PartsError::Filesystem(err.to_string()))?;
    temp.write_all(content)
        .map_err(|err| PartsError::Filesystem(err.to_string()))?;
    temp.persist(path)
        .map_err(|err| PartsError::Filesystem(err.to_string()))?;
    Ok(())
}
