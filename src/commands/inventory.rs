use anyhow::{Context, Result};

use stormtrack::config::Config;
use stormtrack::storage::inventory;

pub fn inventory_report(config: &Config, year: Option<i32>) -> Result<()> {
    let root = &config.output.raw_dir;
    let entries = inventory(root, year)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    if entries.is_empty() {
        println!("No downloaded products under {}", root.display());
        return Ok(());
    }

    println!("Archive Inventory: {}", root.display());
    println!("==================");

    let mut total = 0;
    for entry in &entries {
        println!(
            "{:<6} {:<10} {:<28} {:<26} {:>5}",
            entry.year, entry.basin, entry.storm, entry.product, entry.text_files
        );
        total += entry.text_files;
    }

    println!("\nProduct directories: {}", entries.len());
    println!("Text files: {total}");

    Ok(())
}
