use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use stormtrack::config::Config;
use stormtrack::matching::{
    group_track_table, match_storms, scan_storm_directory, write_matched_csv, TrackTable,
};

/// Default matched-storm table name under the processed directory
pub const MATCHED_STORMS_FILE: &str = "matched_cyclones.csv";

pub fn matched_path(config: &Config, explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| config.output.processed_dir.join(MATCHED_STORMS_FILE))
}

pub fn match_command(config: &Config, track_table: &Path, output: Option<PathBuf>) -> Result<()> {
    let table = TrackTable::load(track_table)
        .with_context(|| format!("Failed to load track table {}", track_table.display()))?;
    let groups = group_track_table(&table);

    let discovered = scan_storm_directory(&config.output.raw_dir)
        .context("Failed to scan storm directory")?;
    let matched = match_storms(&groups, &discovered);

    let output = matched_path(config, output);
    write_matched_csv(&output, &matched)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Storm Matching");
    println!("==============");
    println!("Track table storms: {}", groups.len());
    println!("Storms on disk: {}", discovered.len());
    println!("Matched: {}", matched.len());
    println!("Output: {}", output.display());

    Ok(())
}
