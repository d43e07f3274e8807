//! Forecast bundle export for matched storms
//!
//! Collects the advisory and discussion texts of every matched storm into a
//! single JSON document keyed by `{year}_{basin}_{noaa_name}`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::matching::MatchedStorm;
use crate::models::ProductKind;
use crate::utils::error::StorageError;

/// Bundle filename written under the processed directory
pub const FORECAST_BUNDLE_FILE: &str = "cyclone_forecasts.json";

/// One product text with its issuance timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductText {
    pub filename: String,
    pub timestamp: String,
    pub content: String,
}

/// All collected products of one matched storm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormForecasts {
    pub ibtracs_sid: String,
    pub ibtracs_name: String,
    pub noaa_name: String,
    pub year: i32,
    pub season: Option<i32>,
    pub basin: String,
    pub start_time: String,
    pub end_time: String,
    pub forecasts: Vec<ProductText>,
    pub discussions: Vec<ProductText>,
}

/// Issuance timestamp of a product, or an empty string if none is found
pub fn extract_timestamp(text: &str) -> String {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        [
            Regex::new(r"\d{1,2}:\d{2}\s+(?:AM|PM)\s+[A-Z]{3}\s+\w+\s+\w+\s+\d{1,2}\s+\d{4}")
                .expect("Invalid regex pattern"),
            Regex::new(r"\d{4}\s+UTC\s+\w+\s+\w+\s+\d{1,2}\s+\d{4}")
                .expect("Invalid regex pattern"),
            Regex::new(r"\d{2}/\d{4}Z").expect("Invalid regex pattern"),
        ]
    });

    patterns
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Read the `.txt` products in `dir`, sorted by filename
fn read_products(dir: &Path) -> Result<Vec<ProductText>, StorageError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| StorageError::io(dir, e))? {
        let path = entry.map_err(|e| StorageError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();

    let mut products = Vec::with_capacity(files.len());
    for path in files {
        let bytes = fs::read(&path).map_err(|e| StorageError::io(&path, e))?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        products.push(ProductText {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            timestamp: extract_timestamp(&content),
            content,
        });
    }

    Ok(products)
}

/// Build the bundle for all matched storms
///
/// # Errors
///
/// Returns `StorageError::Io` if a product directory cannot be read
pub fn collect_forecasts(
    storms: &[MatchedStorm],
) -> Result<BTreeMap<String, StormForecasts>, StorageError> {
    let mut bundle = BTreeMap::new();

    for storm in storms {
        let storm_path = Path::new(&storm.noaa_path);
        let forecasts = read_products(&storm_path.join(ProductKind::ForecastAdvisory.full_name()))?;
        let discussions =
            read_products(&storm_path.join(ProductKind::ForecastDiscussion.full_name()))?;

        tracing::debug!(
            storm = %storm.noaa_name,
            forecasts = forecasts.len(),
            discussions = discussions.len(),
            "Collected products"
        );

        let key = format!("{}_{}_{}", storm.year, storm.noaa_basin, storm.noaa_name);
        bundle.insert(
            key,
            StormForecasts {
                ibtracs_sid: storm.ibtracs_sid.clone(),
                ibtracs_name: storm.ibtracs_name.clone(),
                noaa_name: storm.noaa_name.clone(),
                year: storm.year,
                season: storm.season,
                basin: storm.noaa_basin.clone(),
                start_time: storm.start_time.clone(),
                end_time: storm.end_time.clone(),
                forecasts,
                discussions,
            },
        );
    }

    Ok(bundle)
}

/// Collect the bundle and write it as pretty-printed JSON
///
/// # Errors
///
/// Returns `StorageError` if products cannot be read or the file written
pub fn export_forecasts(storms: &[MatchedStorm], path: &Path) -> Result<usize, StorageError> {
    let bundle = collect_forecasts(storms)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(&bundle)?;
    fs::write(path, json).map_err(|e| StorageError::io(path, e))?;

    tracing::info!(path = %path.display(), storms = bundle.len(), "Exported forecast bundle");
    Ok(bundle.len())
}
