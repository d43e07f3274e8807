use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use stormtrack::config::Config;
use stormtrack::matching::{read_matched_csv, TrackTable};
use stormtrack::tracks::{extract_tracks, write_tracks_csv, TrackSummary};

use super::matching::matched_path;

/// Default kinematics table name under the processed directory
pub const TRACKS_FILE: &str = "matched_cyclone_tracks.csv";

pub fn tracks_command(
    config: &Config,
    track_table: &Path,
    matched: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let matched_file = matched_path(config, matched);
    let storms = read_matched_csv(&matched_file)
        .with_context(|| format!("Failed to read {}", matched_file.display()))?;

    let table = TrackTable::load(track_table)
        .with_context(|| format!("Failed to load track table {}", track_table.display()))?;

    let rows = extract_tracks(&table, &storms);
    let summary = TrackSummary::from_rows(&rows);
    summary.log();

    let output = output.unwrap_or_else(|| config.output.processed_dir.join(TRACKS_FILE));
    write_tracks_csv(&output, &rows)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Track Extraction");
    println!("================");
    println!("Records: {}", summary.total_records);
    println!("Storms: {}", summary.storm_count);
    println!(
        "With speed: {}/{} ({:.1}%)",
        summary.speed_available,
        summary.total_records,
        summary.ratio(summary.speed_available) * 100.0
    );
    println!("Output: {}", output.display());

    Ok(())
}
