//! stormtrack - NHC tropical cyclone archive crawler
//!
//! Collects forecast advisories, public advisories, forecast discussions and
//! wind speed probability products from the National Hurricane Center
//! archive, then links the downloaded storms to an IBTrACS-style best-track
//! table and derives track kinematics.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Archive crawling with rate limiting and meta-refresh handling
//! - [`parser`] - Year index, detail page and product parsing
//! - [`models`] - Core data structures and types
//! - [`storage`] - On-disk product tree and inventory
//! - [`matching`] - Storm matching against the track table, forecast export
//! - [`tracks`] - Haversine speed and bearing between track fixes
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use stormtrack::config::Config;
//! use stormtrack::crawler::ArchiveCrawler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let crawler = ArchiveCrawler::new(&config)?;
//!     let stats = crawler.crawl_years(&[2011], &AtomicBool::new(false)).await;
//!     println!("downloaded {}", stats.files_downloaded);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod matching;
pub mod models;
pub mod parser;
pub mod storage;
pub mod tracks;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::ArchiveCrawler;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::matching::query::ForecastBundle;
    pub use crate::matching::{MatchedStorm, TrackTable};
    pub use crate::models::{AdvisoryLink, AdvisoryMap, Basin, CrawlStats, CycloneRecord, ProductKind};
    pub use crate::storage::ProductStore;
    pub use crate::tracks::{TrackRow, TrackSummary};
}

// Direct re-exports for convenience
pub use models::{Basin, CrawlStats, CycloneRecord, ProductKind};
