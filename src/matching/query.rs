//! Read-side queries over an exported forecast bundle
//!
//! A [`ForecastBundle`] is the `cyclone_forecasts.json` document loaded back
//! into memory. Storms are kept in key order, so listings and keyword
//! search results are stable between runs.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::matching::forecasts::{ProductText, StormForecasts};
use crate::matching::normalize_storm_name;
use crate::utils::error::StorageError;

/// Which product lists a keyword search looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    Forecasts,
    Discussions,
    #[default]
    Both,
}

impl SearchScope {
    fn forecasts(self) -> bool {
        matches!(self, Self::Forecasts | Self::Both)
    }

    fn discussions(self) -> bool {
        matches!(self, Self::Discussions | Self::Both)
    }
}

impl FromStr for SearchScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forecasts" => Ok(Self::Forecasts),
            "discussions" => Ok(Self::Discussions),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "unknown search scope '{other}' (expected forecasts, discussions or both)"
            )),
        }
    }
}

/// Kind of product a search hit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    Forecast,
    Discussion,
}

impl std::fmt::Display for HitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HitKind::Forecast => write!(f, "forecast"),
            HitKind::Discussion => write!(f, "discussion"),
        }
    }
}

/// One product whose content contains the keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    #[serde(rename = "type")]
    pub kind: HitKind,
    pub filename: String,
    pub timestamp: String,
}

/// All hits of one storm
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub storm_key: String,
    pub storm_name: String,
    pub year: i32,
    pub basin: String,
    pub matches: Vec<SearchHit>,
}

/// Bundle-wide counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BundleStats {
    pub total_storms: usize,
    pub total_forecasts: usize,
    pub total_discussions: usize,
    pub years: BTreeMap<i32, usize>,
    pub basins: BTreeMap<String, usize>,
}

/// Conditions a storm must meet; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct StormFilter {
    /// Exact storm name, case-insensitive. Matches the stored `noaa_name`
    /// or its normalized form ("ALETTA" finds "TROPICAL STORM ALETTA").
    pub name: Option<String>,
    pub year: Option<i32>,
    /// Basin directory name, e.g. `E_Pacific`
    pub basin: Option<String>,
}

impl StormFilter {
    fn accepts(&self, storm: &StormForecasts) -> bool {
        if let Some(name) = &self.name {
            let wanted = name.trim().to_uppercase();
            let stored = storm.noaa_name.to_uppercase();
            if stored != wanted && normalize_storm_name(&storm.noaa_name) != wanted {
                return false;
            }
        }

        self.year.map_or(true, |year| storm.year == year)
            && self.basin.as_ref().map_or(true, |basin| storm.basin == *basin)
    }
}

/// An exported forecast bundle, keyed by `{year}_{basin}_{noaa_name}`
#[derive(Debug, Clone, Default)]
pub struct ForecastBundle {
    storms: BTreeMap<String, StormForecasts>,
}

impl ForecastBundle {
    /// Load a bundle written by the export step
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be read, or
    /// `StorageError::Json` if it is not a forecast bundle
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let json = std::fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        let bundle = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), storms = bundle.len(), "Loaded forecast bundle");
        Ok(bundle)
    }

    /// Parse a bundle from its JSON text
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Json` if the document does not deserialize
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let storms = serde_json::from_str(json)?;
        Ok(Self { storms })
    }

    pub fn len(&self) -> usize {
        self.storms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storms.is_empty()
    }

    /// Storm keys in order
    pub fn storm_keys(&self) -> impl Iterator<Item = &str> {
        self.storms.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&StormForecasts> {
        self.storms.get(key)
    }

    /// Storms accepted by `filter`, in key order
    pub fn filter<'a>(&'a self, filter: &StormFilter) -> Vec<(&'a str, &'a StormForecasts)> {
        self.storms
            .iter()
            .filter(|(_, storm)| filter.accepts(storm))
            .map(|(key, storm)| (key.as_str(), storm))
            .collect()
    }

    pub fn statistics(&self) -> BundleStats {
        let mut stats = BundleStats {
            total_storms: self.storms.len(),
            ..BundleStats::default()
        };

        for storm in self.storms.values() {
            *stats.years.entry(storm.year).or_default() += 1;
            *stats.basins.entry(storm.basin.clone()).or_default() += 1;
            stats.total_forecasts += storm.forecasts.len();
            stats.total_discussions += storm.discussions.len();
        }

        stats
    }

    /// Case-insensitive keyword search over product contents
    ///
    /// Returns at most `limit` storms, each with every matching product.
    pub fn search(&self, keyword: &str, scope: SearchScope, limit: usize) -> Vec<SearchResult> {
        let needle = keyword.to_lowercase();
        let mut results = Vec::new();

        for (key, storm) in &self.storms {
            if results.len() >= limit {
                break;
            }

            let mut matches = Vec::new();
            if scope.forecasts() {
                collect_hits(&storm.forecasts, &needle, HitKind::Forecast, &mut matches);
            }
            if scope.discussions() {
                collect_hits(&storm.discussions, &needle, HitKind::Discussion, &mut matches);
            }

            if !matches.is_empty() {
                results.push(SearchResult {
                    storm_key: key.clone(),
                    storm_name: storm.noaa_name.clone(),
                    year: storm.year,
                    basin: storm.basin.clone(),
                    matches,
                });
            }
        }

        tracing::debug!(keyword, storms = results.len(), "Searched forecast bundle");
        results
    }
}

fn collect_hits(products: &[ProductText], needle: &str, kind: HitKind, hits: &mut Vec<SearchHit>) {
    for product in products {
        if product.content.to_lowercase().contains(needle) {
            hits.push(SearchHit {
                kind,
                filename: product.filename.clone(),
                timestamp: product.timestamp.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_scope_from_str() {
        assert_eq!("forecasts".parse::<SearchScope>(), Ok(SearchScope::Forecasts));
        assert_eq!("both".parse::<SearchScope>(), Ok(SearchScope::Both));
        assert!("all".parse::<SearchScope>().is_err());
    }

    #[test]
    fn test_hit_serializes_type_key() {
        let hit = SearchHit {
            kind: HitKind::Discussion,
            filename: "al022024.discus.001.txt".into(),
            timestamp: String::new(),
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["type"], "discussion");
        assert_eq!(json["filename"], "al022024.discus.001.txt");
    }

    #[test]
    fn test_malformed_bundle_is_json_error() {
        let err = ForecastBundle::from_json(r#"{"2024_Atlantic_BERYL": {"year": "x"}}"#).unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }
}
