//! Inventory of the downloaded product tree

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::error::StorageError;

/// Count of text products in one `{year}/{basin}/{storm}/{product}` directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    pub year: i32,
    pub basin: String,
    pub storm: String,
    pub product: String,
    pub text_files: usize,
}

/// Walk the product tree under `root`, optionally limited to one year
///
/// Non-numeric year directories and stray files are ignored. Entries are
/// sorted by path. A missing root yields an empty inventory.
///
/// # Errors
///
/// Returns `StorageError::Io` if an existing directory cannot be read
pub fn inventory(root: &Path, year: Option<i32>) -> Result<Vec<InventoryEntry>, StorageError> {
    let mut entries = Vec::new();
    if !root.is_dir() {
        return Ok(entries);
    }

    for year_dir in sorted_subdirs(root)? {
        let Some(dir_year) = dir_name(&year_dir).and_then(|n| parse_year(&n)) else {
            continue;
        };
        if year.is_some_and(|wanted| wanted != dir_year) {
            continue;
        }

        for basin_dir in sorted_subdirs(&year_dir)? {
            for storm_dir in sorted_subdirs(&basin_dir)? {
                for product_dir in sorted_subdirs(&storm_dir)? {
                    entries.push(InventoryEntry {
                        year: dir_year,
                        basin: dir_name(&basin_dir).unwrap_or_default(),
                        storm: dir_name(&storm_dir).unwrap_or_default(),
                        product: dir_name(&product_dir).unwrap_or_default(),
                        text_files: count_text_files(&product_dir)?,
                    });
                }
            }
        }
    }

    Ok(entries)
}

/// Year directories are all-digit names
pub(crate) fn parse_year(name: &str) -> Option<i32> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

pub(crate) fn dir_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Child directories of `dir`, sorted by name
pub(crate) fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| StorageError::io(dir, e))? {
        let entry = entry.map_err(|e| StorageError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn count_text_files(dir: &Path) -> Result<usize, StorageError> {
    let mut count = 0;
    for entry in fs::read_dir(dir).map_err(|e| StorageError::io(dir, e))? {
        let entry = entry.map_err(|e| StorageError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            count += 1;
        }
    }
    Ok(count)
}
