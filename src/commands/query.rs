use anyhow::{Context, Result};
use std::path::PathBuf;

use stormtrack::config::Config;
use stormtrack::matching::forecasts::FORECAST_BUNDLE_FILE;
use stormtrack::matching::query::{ForecastBundle, SearchScope, StormFilter};

/// Matches shown per storm in search output
const HITS_SHOWN: usize = 3;

pub struct QueryArgs {
    pub bundle: Option<PathBuf>,
    pub stats: bool,
    pub list: bool,
    pub name: Option<String>,
    pub year: Option<i32>,
    pub basin: Option<String>,
    pub info: Option<String>,
    pub search: Option<String>,
    pub search_in: SearchScope,
    pub limit: usize,
    pub json: bool,
}

pub fn query_command(config: &Config, args: QueryArgs) -> Result<()> {
    let path = args
        .bundle
        .unwrap_or_else(|| config.output.processed_dir.join(FORECAST_BUNDLE_FILE));
    let bundle = ForecastBundle::load(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    println!("Loaded data for {} storms", bundle.len());

    if args.stats {
        let stats = bundle.statistics();
        println!("\nForecast Bundle Statistics");
        println!("==========================");
        println!("Storms: {}", stats.total_storms);
        println!("Forecast files: {}", stats.total_forecasts);
        println!("Discussion files: {}", stats.total_discussions);
        println!("\nBy year:");
        for (year, count) in &stats.years {
            println!("  {year}: {count} storms");
        }
        println!("\nBy basin:");
        for (basin, count) in &stats.basins {
            println!("  {basin}: {count} storms");
        }
    }

    if args.list {
        println!("\nAll Storms ({})", bundle.len());
        println!("==========");
        for (i, key) in bundle.storm_keys().enumerate() {
            println!("{}. {key}", i + 1);
        }
    }

    if let Some(name) = &args.name {
        let filter = StormFilter {
            name: Some(name.clone()),
            year: args.year,
            basin: None,
        };
        let storms = bundle.filter(&filter);

        println!("\nName: {name}");
        println!("======");
        if storms.is_empty() {
            println!("No matching storms");
        }
        for (key, storm) in storms {
            println!("\n{key}");
            println!("  Year: {}, Basin: {}", storm.year, storm.basin);
            println!(
                "  Forecasts: {}, Discussions: {}",
                storm.forecasts.len(),
                storm.discussions.len()
            );
        }
    } else if let Some(year) = args.year {
        let storms = bundle.filter(&StormFilter {
            year: Some(year),
            ..StormFilter::default()
        });

        println!("\nYear: {year} ({} storms)", storms.len());
        println!("======");
        for (key, storm) in storms {
            println!("{key} - {}", storm.basin);
        }
    }

    if let Some(basin) = &args.basin {
        let storms = bundle.filter(&StormFilter {
            basin: Some(basin.clone()),
            ..StormFilter::default()
        });

        println!("\nBasin: {basin} ({} storms)", storms.len());
        println!("=======");
        for (key, storm) in storms {
            println!("{key} - {}", storm.year);
        }
    }

    if let Some(key) = &args.info {
        print_storm_info(&bundle, key);
    }

    if let Some(keyword) = &args.search {
        let results = bundle.search(keyword, args.search_in, args.limit);

        if args.json {
            let json = serde_json::to_string_pretty(&results)
                .context("Failed to serialize search results")?;
            println!("{json}");
            return Ok(());
        }

        println!("\nSearch: '{keyword}'");
        println!("========");
        println!("Storms with matches: {}", results.len());
        for result in &results {
            println!("\n{}", result.storm_key);
            println!("  Matches: {}", result.matches.len());
            for hit in result.matches.iter().take(HITS_SHOWN) {
                println!("    - {}: {} ({})", hit.kind, hit.filename, hit.timestamp);
            }
        }
    }

    Ok(())
}

fn print_storm_info(bundle: &ForecastBundle, key: &str) {
    let Some(storm) = bundle.get(key) else {
        println!("Storm not found: {key}");
        return;
    };

    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("Storm: {key}");
    println!("{rule}");
    println!("IBTrACS SID: {}", storm.ibtracs_sid);
    println!("IBTrACS Name: {}", storm.ibtracs_name);
    println!("NOAA Name: {}", storm.noaa_name);
    println!("Year: {}", storm.year);
    match storm.season {
        Some(season) => println!("Season: {season}"),
        None => println!("Season: unknown"),
    }
    println!("Basin: {}", storm.basin);
    println!("Start Time: {}", storm.start_time);
    println!("End Time: {}", storm.end_time);
    println!("\nForecasts: {} files", storm.forecasts.len());
    println!("Discussions: {} files", storm.discussions.len());

    if let Some(first) = storm.forecasts.first() {
        println!("\nFirst forecast: {}", first.filename);
        println!("  Timestamp: {}", first.timestamp);
    }
    if let Some(first) = storm.discussions.first() {
        println!("\nFirst discussion: {}", first.filename);
        println!("  Timestamp: {}", first.timestamp);
    }
    println!("{rule}\n");
}
