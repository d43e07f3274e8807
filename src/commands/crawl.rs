use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use stormtrack::config::Config;
use stormtrack::crawler::ArchiveCrawler;
use stormtrack::models::CrawlStats;

/// Years to crawl from either an explicit list or an inclusive range
pub fn resolve_years(years: Vec<i32>, from: Option<i32>, to: Option<i32>) -> Result<Vec<i32>> {
    if !years.is_empty() {
        return Ok(years);
    }

    match (from, to) {
        (Some(from), Some(to)) if from <= to => Ok((from..=to).collect()),
        (Some(from), Some(to)) => anyhow::bail!("--from {from} is after --to {to}"),
        (Some(from), None) => Ok(vec![from]),
        _ => anyhow::bail!("Specify --years or --from/--to"),
    }
}

pub async fn crawl(config: Config, years: Vec<i32>) -> Result<()> {
    println!("Starting NHC Archive Crawl");
    println!("==========================");
    println!("Years: {years:?}");
    println!("Output directory: {}", config.output.raw_dir.display());

    let crawler = ArchiveCrawler::new(&config).context("Failed to create crawler")?;

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupt);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after current download");
            flag.store(true, Ordering::Relaxed);
        }
    });

    let stats = crawler.crawl_years(&years, &interrupt).await;

    if interrupt.load(Ordering::Relaxed) {
        println!("\nCrawl interrupted, partial results below");
    }
    print_summary(&stats);

    Ok(())
}

fn print_summary(stats: &CrawlStats) {
    println!("\nCrawl Summary");
    println!("=============");
    println!("Years processed: {}", stats.years_processed);
    println!("Cyclones processed: {}", stats.cyclones_processed);
    println!("Files downloaded: {}", stats.files_downloaded);
    println!("Files skipped (existing): {}", stats.files_skipped);
    println!("Files failed: {}", stats.files_failed);
    println!("Success rate: {:.1}%", stats.success_rate() * 100.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_years() {
        assert_eq!(resolve_years(vec![2011, 2003], None, None).unwrap(), vec![2011, 2003]);
        assert_eq!(
            resolve_years(vec![], Some(1998), Some(2000)).unwrap(),
            vec![1998, 1999, 2000]
        );
        assert!(resolve_years(vec![], Some(2001), Some(2000)).is_err());
        assert!(resolve_years(vec![], None, None).is_err());
    }
}
