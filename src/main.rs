mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stormtrack::config::Config;
use stormtrack::matching::query::SearchScope;

#[derive(Parser)]
#[command(
    name = "stormtrack",
    version,
    about = "NHC tropical cyclone archive crawler with IBTrACS matching and track kinematics",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (defaults to STORMTRACK_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the raw product directory
    #[arg(long, global = true)]
    raw_dir: Option<PathBuf>,

    /// Override the processed output directory
    #[arg(long, global = true)]
    processed_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download advisory products from the NHC archive
    Crawl {
        /// Years to crawl, comma separated
        #[arg(short, long, value_delimiter = ',')]
        years: Vec<i32>,

        /// First year of an inclusive range
        #[arg(long)]
        from: Option<i32>,

        /// Last year of an inclusive range
        #[arg(long)]
        to: Option<i32>,
    },

    /// Show per-product file counts of the downloaded tree
    Inventory {
        /// Limit to one year
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Match downloaded storms against a track table
    Match {
        /// IBTrACS-style track table CSV
        #[arg(short, long)]
        track_table: PathBuf,

        /// Output CSV (defaults to matched_cyclones.csv in the processed directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract track kinematics for matched storms
    Tracks {
        /// IBTrACS-style track table CSV
        #[arg(short, long)]
        track_table: PathBuf,

        /// Matched storm CSV produced by `match`
        #[arg(short, long)]
        matched: Option<PathBuf>,

        /// Output CSV (defaults to matched_cyclone_tracks.csv in the processed directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export advisory and discussion texts of matched storms as JSON
    Export {
        /// Matched storm CSV produced by `match`
        #[arg(short, long)]
        matched: Option<PathBuf>,

        /// Output JSON (defaults to cyclone_forecasts.json in the processed directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Query an exported forecast bundle
    Query {
        /// Bundle JSON (defaults to cyclone_forecasts.json in the processed directory)
        #[arg(short, long)]
        bundle: Option<PathBuf>,

        /// Show storm, product, year and basin counts
        #[arg(long)]
        stats: bool,

        /// List every storm key
        #[arg(long)]
        list: bool,

        /// Storms with this name (combine with --year to narrow)
        #[arg(short, long)]
        name: Option<String>,

        /// Storms of this year
        #[arg(short, long)]
        year: Option<i32>,

        /// Storms of this basin (Atlantic, E_Pacific, C_Pacific)
        #[arg(long)]
        basin: Option<String>,

        /// Details of one storm key, e.g. 2024_Atlantic_BERYL
        #[arg(long)]
        info: Option<String>,

        /// Case-insensitive keyword to search in product texts
        #[arg(short, long)]
        search: Option<String>,

        /// Products to search (forecasts, discussions, both)
        #[arg(long, default_value = "both")]
        search_in: SearchScope,

        /// Maximum number of storms in search results
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Print search results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;

    // Initialize tracing/logging
    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    tracing::info!("stormtrack starting");

    match cli.command {
        Commands::Crawl { years, from, to } => {
            let years = commands::resolve_years(years, from, to)?;
            tracing::info!(years = ?years, "Starting crawl command");
            commands::crawl(config, years).await?;
        }

        Commands::Inventory { year } => {
            commands::inventory_report(&config, year)?;
        }

        Commands::Match {
            track_table,
            output,
        } => {
            tracing::info!(track_table = %track_table.display(), "Starting match command");
            commands::match_command(&config, &track_table, output)?;
        }

        Commands::Tracks {
            track_table,
            matched,
            output,
        } => {
            tracing::info!(track_table = %track_table.display(), "Starting tracks command");
            commands::tracks_command(&config, &track_table, matched, output)?;
        }

        Commands::Export { matched, output } => {
            commands::export_command(&config, matched, output)?;
        }

        Commands::Query {
            bundle,
            stats,
            list,
            name,
            year,
            basin,
            info,
            search,
            search_in,
            limit,
            json,
        } => {
            let args = commands::QueryArgs {
                bundle,
                stats,
                list,
                name,
                year,
                basin,
                info,
                search,
                search_in,
                limit,
                json,
            };
            commands::query_command(&config, args)?;
        }
    }

    Ok(())
}

/// Configuration file or environment, then command-line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    if let Some(raw_dir) = &cli.raw_dir {
        config.output.raw_dir = raw_dir.clone();
    }
    if let Some(processed_dir) = &cli.processed_dir {
        config.output.processed_dir = processed_dir.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("stormtrack=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("stormtrack={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}
