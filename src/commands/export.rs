use anyhow::{Context, Result};
use std::path::PathBuf;

use stormtrack::config::Config;
use stormtrack::matching::forecasts::{export_forecasts, FORECAST_BUNDLE_FILE};
use stormtrack::matching::read_matched_csv;

use super::matching::matched_path;

pub fn export_command(
    config: &Config,
    matched: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let matched_file = matched_path(config, matched);
    let storms = read_matched_csv(&matched_file)
        .with_context(|| format!("Failed to read {}", matched_file.display()))?;

    let output =
        output.unwrap_or_else(|| config.output.processed_dir.join(FORECAST_BUNDLE_FILE));
    let exported = export_forecasts(&storms, &output)
        .with_context(|| format!("Failed to export {}", output.display()))?;

    println!("Exported {exported} storms to {}", output.display());
    Ok(())
}
