//! NHC archive crawling
//!
//! This module implements the crawl pipeline: year index page -> cyclone
//! detail pages -> advisory products on disk. Requests are issued one at a
//! time through a rate-limited [`ArchiveFetcher`](fetcher::ArchiveFetcher),
//! with a courtesy pause after every product download.

pub mod download;
pub mod fetcher;
pub mod url;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{AdvisoryMap, Basin, CrawlStats, CycloneRecord};
use crate::parser::{empty_advisory_map, parse_year_page, resolve_advisory_links};
use crate::storage::ProductStore;

use self::download::{download, DownloadOutcome};
use self::fetcher::ArchiveFetcher;
use self::url::{parse_base_url, product_filename, year_url};

/// Sequential crawler over the NHC archive
pub struct ArchiveCrawler {
    fetcher: ArchiveFetcher,
    store: ProductStore,
    base_url: ::url::Url,
    download_delay: Duration,
}

impl ArchiveCrawler {
    /// Create a crawler from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: &Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::config(format!("Invalid configuration: {e}")))?;

        let fetcher = ArchiveFetcher::from_config(config)?;
        let base_url = parse_base_url(&config.crawler.base_url)?;

        Ok(Self {
            fetcher,
            store: ProductStore::new(&config.output.raw_dir),
            base_url,
            download_delay: config.download_delay(),
        })
    }

    /// Product store the crawler writes into
    pub fn store(&self) -> &ProductStore {
        &self.store
    }

    /// Cyclones listed on a year's index page
    ///
    /// A page that cannot be fetched yields an empty list.
    pub async fn list_cyclones_for_year(&self, year: i32) -> Vec<CycloneRecord> {
        let page_url = match year_url(&self.base_url, year) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(year, error = %e, "Cannot build year URL");
                return Vec::new();
            }
        };

        let html = match self.fetcher.fetch(page_url.as_str()).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(year, url = %page_url, error = %e, "Failed to fetch year index");
                return Vec::new();
            }
        };

        let cyclones = parse_year_page(&html, year, &page_url);

        let mut per_basin: BTreeMap<Basin, usize> = BTreeMap::new();
        for cyclone in &cyclones {
            *per_basin.entry(cyclone.basin).or_default() += 1;
        }
        for (basin, count) in &per_basin {
            tracing::info!(year, basin = %basin, count, "Cyclones found");
        }
        if cyclones.is_empty() {
            tracing::info!(year, "No cyclones found");
        }

        cyclones
    }

    /// Advisory links on a cyclone's detail page
    ///
    /// A page that cannot be fetched yields an empty list for every kind.
    pub async fn resolve_advisories(&self, cyclone: &CycloneRecord, year: i32) -> AdvisoryMap {
        let page_url = match ::url::Url::parse(&cyclone.detail_url) {
            Ok(url) => url,
            Err(_) => {
                tracing::warn!(cyclone = %cyclone.name, url = %cyclone.detail_url, "Invalid detail URL");
                return empty_advisory_map();
            }
        };

        match self.fetcher.fetch(page_url.as_str()).await {
            Ok(html) => resolve_advisory_links(&html, cyclone, year, &page_url),
            Err(e) => {
                tracing::warn!(
                    cyclone = %cyclone.name,
                    url = %page_url,
                    error = %e,
                    "Failed to fetch cyclone page"
                );
                empty_advisory_map()
            }
        }
    }

    /// Download every missing product of one cyclone
    pub async fn crawl_cyclone(&self, year: i32, cyclone: &CycloneRecord) -> CrawlStats {
        self.crawl_cyclone_until(year, cyclone, &AtomicBool::new(false))
            .await
    }

    async fn crawl_cyclone_until(
        &self,
        year: i32,
        cyclone: &CycloneRecord,
        interrupt: &AtomicBool,
    ) -> CrawlStats {
        let mut stats = CrawlStats::default();
        let advisories = self.resolve_advisories(cyclone, year).await;

        for (kind, links) in &advisories {
            if links.is_empty() {
                continue;
            }
            tracing::info!(cyclone = %cyclone.name, kind = %kind, count = links.len(), "Downloading products");

            let dir = self.store.product_dir(year, cyclone.basin, &cyclone.name, *kind);

            for (index, link) in links.iter().enumerate() {
                if interrupt.load(Ordering::Relaxed) {
                    return stats;
                }

                let filename = product_filename(&link.url, cyclone.format, &cyclone.name, index + 1);
                let destination = dir.join(filename);

                if self.store.exists(&destination) {
                    stats.files_skipped += 1;
                    continue;
                }

                match download(&self.fetcher, &self.store, &link.url, &destination).await {
                    Ok(DownloadOutcome::Text(_)) => stats.files_downloaded += 1,
                    Ok(DownloadOutcome::Html(path)) => {
                        tracing::debug!(path = %path.display(), "No <pre> block, kept raw HTML");
                        stats.files_downloaded += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            url = %link.url,
                            error = %e,
                            recoverable = e.is_recoverable(),
                            "Failed to download product"
                        );
                        stats.files_failed += 1;
                    }
                }

                tokio::time::sleep(self.download_delay).await;
            }
        }

        stats.cyclones_processed += 1;
        stats
    }

    /// Crawl every cyclone of one year
    pub async fn crawl_year(&self, year: i32) -> CrawlStats {
        self.crawl_year_until(year, &AtomicBool::new(false)).await
    }

    async fn crawl_year_until(&self, year: i32, interrupt: &AtomicBool) -> CrawlStats {
        tracing::info!(year, "Crawling year");

        let mut stats = CrawlStats::default();
        let cyclones = self.list_cyclones_for_year(year).await;

        for (i, cyclone) in cyclones.iter().enumerate() {
            if interrupt.load(Ordering::Relaxed) {
                return stats;
            }

            tracing::info!(
                year,
                progress = %format!("{}/{}", i + 1, cyclones.len()),
                cyclone = %cyclone.name,
                basin = %cyclone.basin,
                "Processing cyclone"
            );
            stats.merge(self.crawl_cyclone_until(year, cyclone, interrupt).await);
        }

        stats.years_processed += 1;
        stats
    }

    /// Crawl several years in order, stopping early once `interrupt` is set
    ///
    /// The returned counters cover everything completed before the stop.
    pub async fn crawl_years(&self, years: &[i32], interrupt: &AtomicBool) -> CrawlStats {
        let mut stats = CrawlStats::default();

        for &year in years {
            if interrupt.load(Ordering::Relaxed) {
                tracing::warn!(year, "Crawl interrupted");
                break;
            }
            stats.merge(self.crawl_year_until(year, interrupt).await);
        }

        stats
    }
}
