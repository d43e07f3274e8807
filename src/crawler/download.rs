//! Advisory product downloader

use std::path::{Path, PathBuf};

use crate::crawler::fetcher::ArchiveFetcher;
use crate::parser::html::{classify_product, ProductBody};
use crate::storage::ProductStore;
use crate::utils::error::FetchError;

/// What a completed download wrote to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Bulletin text at the requested destination
    Text(PathBuf),
    /// Raw page saved next to the destination with an `.html` extension
    Html(PathBuf),
}

impl DownloadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            DownloadOutcome::Text(path) | DownloadOutcome::Html(path) => path,
        }
    }
}

/// Fetch one product and persist it under `destination`
///
/// Callers check [`ProductStore::exists`] first; this always fetches.
///
/// # Errors
///
/// Returns the fetch failure, or `FetchError::Write` if the file cannot
/// be written
pub async fn download(
    fetcher: &ArchiveFetcher,
    store: &ProductStore,
    url: &str,
    destination: &Path,
) -> Result<DownloadOutcome, FetchError> {
    let body = fetcher.fetch(url).await?;

    let (path, content, outcome): (PathBuf, String, fn(PathBuf) -> DownloadOutcome) =
        match classify_product(body) {
            ProductBody::Text(text) => (destination.to_path_buf(), text, DownloadOutcome::Text),
            ProductBody::Html(html) => {
                (destination.with_extension("html"), html, DownloadOutcome::Html)
            }
        };

    store.save(&path, &content)?;

    Ok(outcome(path))
}
