//! Filesystem storage for downloaded advisory products
//!
//! Products are stored as
//! `{root}/{year}/{basin}/{storm}/{product}/{file}`, e.g.
//! `noaa_complete/2011/Atlantic/IRENE/forecast_advisory/al092011.fstadv.001.txt`.
//! A file's presence is the only record that a product was downloaded.

pub mod inventory;

pub use inventory::{inventory, InventoryEntry};

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{Basin, ProductKind};
use crate::utils::error::StorageError;
use crate::utils::sanitize_filename;

/// Writer for the per-storm product tree
#[derive(Debug, Clone)]
pub struct ProductStore {
    /// Root of the year directories
    root: PathBuf,
}

impl ProductStore {
    /// Create a store rooted at `root`; directories are created lazily
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding one product kind of one storm
    #[must_use]
    pub fn product_dir(&self, year: i32, basin: Basin, storm_name: &str, kind: ProductKind) -> PathBuf {
        self.root
            .join(year.to_string())
            .join(basin.as_str())
            .join(sanitize_filename(storm_name))
            .join(kind.full_name())
    }

    /// True if `path` or its `.html` fallback sibling is already on disk
    #[must_use]
    pub fn exists(&self, path: &Path) -> bool {
        path.exists() || path.with_extension("html").exists()
    }

    /// Write `content` to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory or file cannot be written
    pub fn save(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        fs::write(path, content).map_err(|e| StorageError::io(path, e))?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "Saved product");
        Ok(())
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}
