//! Matching archive storms against an IBTrACS-style track table
//!
//! Storm directories found on disk are paired with track-table storms of the
//! same year whose name contains the directory's normalized name. The first
//! qualifying storm in table order wins.

pub mod forecasts;
pub mod query;
pub mod track_table;

pub use track_table::{TrackFix, TrackTable};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::models::ProductKind;
use crate::storage::inventory::{dir_name, parse_year, sorted_subdirs};
use crate::utils::error::StorageError;

/// A storm directory holding at least one advisory or discussion product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredStorm {
    pub year: i32,
    pub basin: String,
    pub storm_name: String,
    pub storm_path: PathBuf,
    pub has_advisory: bool,
    pub has_discussion: bool,
}

/// Track-table storm grouped by `(sid, name, year)`
#[derive(Debug, Clone, PartialEq)]
pub struct StormGroup {
    pub sid: String,
    pub name: String,
    pub year: i32,
    pub season: Option<i32>,
    pub start_time: String,
    pub end_time: String,
}

/// A discovered storm paired with its track-table storm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedStorm {
    pub ibtracs_sid: String,
    pub ibtracs_name: String,
    pub year: i32,
    pub season: Option<i32>,
    pub start_time: String,
    pub end_time: String,
    pub noaa_basin: String,
    pub noaa_name: String,
    pub noaa_path: String,
    pub has_advisory: bool,
    pub has_discussion: bool,
}

/// Reduce an archive storm name to the bare upper-case name
///
/// "Potential Tropical Cyclone ONE" -> "ONE", "Hurricane Beryl" -> "BERYL"
pub fn normalize_storm_name(name: &str) -> String {
    static PREFIXES: OnceLock<[Regex; 3]> = OnceLock::new();
    let prefixes = PREFIXES.get_or_init(|| {
        [
            Regex::new(r"(?i)^Potential Tropical Cyclone\s+").expect("Invalid regex pattern"),
            Regex::new(r"(?i)^Tropical (?:Depression|Storm|Cyclone)\s+")
                .expect("Invalid regex pattern"),
            Regex::new(r"(?i)^Hurricane\s+").expect("Invalid regex pattern"),
        ]
    });

    let mut stripped = name.trim().to_string();
    for prefix in prefixes {
        stripped = prefix.replace(&stripped, "").into_owned();
    }

    match stripped.split_whitespace().next() {
        Some(first) => first.to_uppercase(),
        None => stripped.to_uppercase(),
    }
}

/// Scan `{root}/{year}/{basin}/{storm}` for storms with products
///
/// Storm names are the trimmed, upper-cased directory names; `storm_path`
/// keeps the directory as found on disk.
///
/// # Errors
///
/// Returns `StorageError::Io` if an existing directory cannot be read
pub fn scan_storm_directory(root: &Path) -> Result<Vec<DiscoveredStorm>, StorageError> {
    let mut storms = Vec::new();
    if !root.is_dir() {
        tracing::warn!(root = %root.display(), "Storm directory does not exist");
        return Ok(storms);
    }

    for year_dir in sorted_subdirs(root)? {
        let Some(year) = dir_name(&year_dir).and_then(|n| parse_year(&n)) else {
            continue;
        };

        for basin_dir in sorted_subdirs(&year_dir)? {
            for storm_dir in sorted_subdirs(&basin_dir)? {
                let has_advisory =
                    has_entries(&storm_dir.join(ProductKind::ForecastAdvisory.full_name()));
                let has_discussion =
                    has_entries(&storm_dir.join(ProductKind::ForecastDiscussion.full_name()));

                if !has_advisory && !has_discussion {
                    continue;
                }

                storms.push(DiscoveredStorm {
                    year,
                    basin: dir_name(&basin_dir).unwrap_or_default(),
                    storm_name: dir_name(&storm_dir)
                        .map(|n| n.trim().to_uppercase())
                        .unwrap_or_default(),
                    storm_path: storm_dir,
                    has_advisory,
                    has_discussion,
                });
            }
        }
    }

    tracing::info!(count = storms.len(), "Discovered storms with products");
    Ok(storms)
}

fn has_entries(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Group track fixes into storms, in order of first appearance
///
/// Fixes whose `iso_time` does not parse carry no year and are left out.
pub fn group_track_table(table: &TrackTable) -> Vec<StormGroup> {
    let mut groups: Vec<StormGroup> = Vec::new();
    let mut index: std::collections::HashMap<(String, String, i32), usize> =
        std::collections::HashMap::new();

    for fix in &table.fixes {
        let Some(year) = fix.year() else {
            continue;
        };
        let name = fix.name.trim().to_uppercase();
        let key = (fix.sid.clone(), name.clone(), year);

        match index.get(&key) {
            Some(&i) => {
                let group = &mut groups[i];
                if fix.iso_time < group.start_time {
                    group.start_time = fix.iso_time.clone();
                }
                if fix.iso_time > group.end_time {
                    group.end_time = fix.iso_time.clone();
                }
            }
            None => {
                index.insert(key, groups.len());
                groups.push(StormGroup {
                    sid: fix.sid.clone(),
                    name,
                    year,
                    season: fix.season,
                    start_time: fix.iso_time.clone(),
                    end_time: fix.iso_time.clone(),
                });
            }
        }
    }

    groups
}

/// Pair each discovered storm with the first same-year group whose name
/// contains its normalized name; unmatched storms are dropped
pub fn match_storms(groups: &[StormGroup], discovered: &[DiscoveredStorm]) -> Vec<MatchedStorm> {
    let mut matched = Vec::new();

    for storm in discovered {
        let clean = normalize_storm_name(&storm.storm_name);

        let Some(group) = groups
            .iter()
            .find(|g| g.year == storm.year && g.name.contains(&clean))
        else {
            tracing::debug!(storm = %storm.storm_name, year = storm.year, "No track-table match");
            continue;
        };

        matched.push(MatchedStorm {
            ibtracs_sid: group.sid.clone(),
            ibtracs_name: group.name.clone(),
            year: storm.year,
            season: group.season,
            start_time: group.start_time.clone(),
            end_time: group.end_time.clone(),
            noaa_basin: storm.basin.clone(),
            noaa_name: storm.storm_name.clone(),
            noaa_path: storm.storm_path.display().to_string(),
            has_advisory: storm.has_advisory,
            has_discussion: storm.has_discussion,
        });
    }

    tracing::info!(
        discovered = discovered.len(),
        matched = matched.len(),
        "Matched storms against track table"
    );
    matched
}

/// Write matched storms as CSV
///
/// # Errors
///
/// Returns `StorageError` if the file cannot be created or written
pub fn write_matched_csv(path: &Path, storms: &[MatchedStorm]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let mut wtr = csv::Writer::from_path(path)?;
    for storm in storms {
        wtr.serialize(storm)?;
    }
    wtr.flush().map_err(|e| StorageError::io(path, e))?;

    Ok(())
}

/// Read a matched-storm CSV written by [`write_matched_csv`]
///
/// # Errors
///
/// Returns `StorageError` if the file cannot be read or a row is malformed
pub fn read_matched_csv(path: &Path) -> Result<Vec<MatchedStorm>, StorageError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut storms = Vec::new();
    for result in rdr.deserialize() {
        storms.push(result?);
    }
    Ok(storms)
}
