// Core data structures for the stormtrack crawler

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ocean basin a cyclone was tracked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Basin {
    Atlantic,
    #[serde(rename = "E_Pacific")]
    EastPacific,
    #[serde(rename = "C_Pacific")]
    CentralPacific,
    Unknown,
}

impl Basin {
    /// Look up a basin from its lower-case ATCF code (`al`, `ep`, `cp`)
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "al" => Some(Self::Atlantic),
            "ep" => Some(Self::EastPacific),
            "cp" => Some(Self::CentralPacific),
            _ => None,
        }
    }

    /// Directory name used in the output tree
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Atlantic => "Atlantic",
            Self::EastPacific => "E_Pacific",
            Self::CentralPacific => "C_Pacific",
            Self::Unknown => "Unknown",
        }
    }

    /// Two-letter ATCF code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Atlantic => "al",
            Self::EastPacific => "ep",
            Self::CentralPacific => "cp",
            Self::Unknown => "",
        }
    }
}

impl std::fmt::Display for Basin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Archive page generation a cyclone was discovered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    /// 2008 and later, pages annotated with `atcf_index` comments
    New,
    /// 1998 to 2007 table layouts
    Legacy,
}

/// The four NHC text products collected per cyclone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    ForecastAdvisory,
    PublicAdvisory,
    ForecastDiscussion,
    WindSpeedProbabilities,
}

impl ProductKind {
    /// Short name used in archive filenames (`al012011.fstadv.001.shtml`)
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::ForecastAdvisory => "fstadv",
            Self::PublicAdvisory => "public",
            Self::ForecastDiscussion => "discus",
            Self::WindSpeedProbabilities => "wndprb",
        }
    }

    /// Directory name used in the output tree
    pub fn full_name(&self) -> &'static str {
        match self {
            Self::ForecastAdvisory => "forecast_advisory",
            Self::PublicAdvisory => "public_advisory",
            Self::ForecastDiscussion => "forecast_discussion",
            Self::WindSpeedProbabilities => "wind_speed_probabilities",
        }
    }

    /// Filename aliases accepted on 2003-2007 pages
    pub fn legacy_aliases(&self) -> &'static [&'static str] {
        match self {
            Self::ForecastAdvisory => &["fstadv"],
            Self::PublicAdvisory => &["public"],
            Self::ForecastDiscussion => &["discus"],
            Self::WindSpeedProbabilities => &["wndprb", "prblty"],
        }
    }

    /// Pre-2003 archive subdirectory holding this product
    pub fn legacy_dir(&self) -> &'static str {
        match self {
            Self::ForecastAdvisory => "mar",
            Self::PublicAdvisory => "pub",
            Self::ForecastDiscussion => "dis",
            Self::WindSpeedProbabilities => "prb",
        }
    }

    /// Get all product kinds in crawl order
    pub fn all() -> [Self; 4] {
        [
            Self::ForecastAdvisory,
            Self::PublicAdvisory,
            Self::ForecastDiscussion,
            Self::WindSpeedProbabilities,
        ]
    }
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// One storm of one year as listed on an archive index page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycloneRecord {
    /// `al012011` style ATCF index, or `legacy_{year}_{name}`
    pub id: String,
    /// Bare upper-case storm name
    pub name: String,
    /// Name as displayed, e.g. "Hurricane IRENE"
    pub full_name: String,
    pub detail_url: String,
    pub format: PageFormat,
    pub basin: Basin,
    pub basin_code: String,
}

/// Resolved URL of one product instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryLink {
    pub product_kind: ProductKind,
    pub url: String,
    /// Trailing sequence number in the filename, if any
    pub sequence_hint: Option<u32>,
}

/// Product links of one cyclone, each list sorted by URL
pub type AdvisoryMap = BTreeMap<ProductKind, Vec<AdvisoryLink>>;

/// Counters accumulated by a crawl run
///
/// Returned by value from every crawl operation and merged by the caller,
/// so partial progress survives an interrupted batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    pub years_processed: u32,
    pub cyclones_processed: u32,
    pub files_downloaded: u32,
    pub files_skipped: u32,
    pub files_failed: u32,
}

impl CrawlStats {
    /// Fold another run's counters into this one
    pub fn merge(&mut self, other: CrawlStats) {
        self.years_processed += other.years_processed;
        self.cyclones_processed += other.cyclones_processed;
        self.files_downloaded += other.files_downloaded;
        self.files_skipped += other.files_skipped;
        self.files_failed += other.files_failed;
    }

    /// Success rate over attempted downloads (skips excluded)
    pub fn success_rate(&self) -> f64 {
        let attempted = self.files_downloaded + self.files_failed;
        if attempted == 0 {
            return 0.0;
        }
        self.files_downloaded as f64 / attempted as f64
    }
}
