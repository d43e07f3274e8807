//! Archive URL construction and product filename derivation
//!
//! The archive is addressed as:
//! - Year index: `{base}{year}/`
//! - New-format products: `.../{id}{year}.{kind}.{nnn}.shtml`
//! - Legacy products: `.../archive/{year}/{dir}/MAL0198.001` and similar

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use crate::models::PageFormat;
use crate::utils::error::ParseError;
use crate::utils::last_path_segment;

/// Parse the archive base URL, adding the trailing slash `join` needs
///
/// # Errors
///
/// Returns `ParseError::InvalidUrl` if the base is not an absolute URL
pub fn parse_base_url(base: &str) -> Result<Url, ParseError> {
    let normalized = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };

    Url::parse(&normalized).map_err(|_| ParseError::InvalidUrl(base.to_string()))
}

/// Index page URL of one archive year
///
/// # Errors
///
/// Returns `ParseError::InvalidUrl` if the joined URL is malformed
pub fn year_url(base: &Url, year: i32) -> Result<Url, ParseError> {
    base.join(&format!("{year}/"))
        .map_err(|_| ParseError::InvalidUrl(format!("{base}{year}/")))
}

/// Trailing sequence number of a product filename
///
/// `al012011.fstadv.003.shtml` -> 3, `MAL0198.012` -> 12
pub fn sequence_hint(url: &str) -> Option<u32> {
    static SEQUENCE_RE: OnceLock<Regex> = OnceLock::new();
    let re = SEQUENCE_RE.get_or_init(|| {
        Regex::new(r"\.(\d+)(?:\.s?html?)?$").expect("Invalid regex pattern")
    });

    let segment = last_path_segment(url)?;
    re.captures(&segment)?.get(1)?.as_str().parse().ok()
}

/// Local filename for a downloaded product
///
/// The last URL segment with `.shtml`/`.html` replaced by `.txt`. Legacy
/// filenames that still lack `.txt` (e.g. `MAL0198.001`) are renamed to
/// `{name}_advisory_{index:03}.txt` with `index` counted from 1.
pub fn product_filename(url: &str, format: PageFormat, storm_name: &str, index: usize) -> String {
    let segment = last_path_segment(url).unwrap_or_default();
    let filename = segment.replace(".shtml", ".txt").replace(".html", ".txt");

    if format == PageFormat::Legacy && !filename.ends_with(".txt") {
        return format!("{}_advisory_{index:03}.txt", storm_name.to_lowercase());
    }

    filename
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_url() {
        let base = parse_base_url("https://www.nhc.noaa.gov/archive").unwrap();
        assert_eq!(
            year_url(&base, 2011).unwrap().as_str(),
            "https://www.nhc.noaa.gov/archive/2011/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            parse_base_url("archive"),
            Err(ParseError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_sequence_hint() {
        assert_eq!(
            sequence_hint("https://www.nhc.noaa.gov/archive/2011/al09/al092011.fstadv.003.shtml?"),
            Some(3)
        );
        assert_eq!(
            sequence_hint("https://www.nhc.noaa.gov/archive/1998/mar/MAL0198.012"),
            Some(12)
        );
        assert_eq!(sequence_hint("https://www.nhc.noaa.gov/archive/1999/dis/NAL0199.003.html"), Some(3));
        assert_eq!(sequence_hint("https://www.nhc.noaa.gov/archive/2011/"), None);
    }

    #[test]
    fn test_product_filename_new_format() {
        assert_eq!(
            product_filename(
                "https://www.nhc.noaa.gov/archive/2011/al09/al092011.fstadv.003.shtml?",
                PageFormat::New,
                "IRENE",
                3
            ),
            "al092011.fstadv.003.txt"
        );
    }

    #[test]
    fn test_product_filename_legacy() {
        assert_eq!(
            product_filename(
                "https://www.nhc.noaa.gov/archive/1998/mar/MAL0198.001",
                PageFormat::Legacy,
                "ALEX",
                1
            ),
            "alex_advisory_001.txt"
        );
        assert_eq!(
            product_filename(
                "https://www.nhc.noaa.gov/archive/1999/pub/PAL0199.002.html",
                PageFormat::Legacy,
                "ARLENE",
                2
            ),
            "PAL0199.002.txt"
        );
    }
}
