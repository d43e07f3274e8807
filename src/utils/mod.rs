//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").to_string()
}

/// Sanitize a path component by replacing characters invalid in filenames
pub fn sanitize_filename(filename: &str) -> String {
    static INVALID_CHARS: OnceLock<Regex> = OnceLock::new();

    let re =
        INVALID_CHARS.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("Invalid regex pattern"));

    re.replace_all(filename.trim(), "_").to_string()
}

/// Last non-empty path segment of a URL, ignoring query and fragment
pub fn last_path_segment(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Hurricane   IRENE  "), "Hurricane IRENE");
        assert_eq!(normalize_whitespace("Tropical\n\nStorm"), "Tropical Storm");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("ONE/TWO"), "ONE_TWO");
        assert_eq!(sanitize_filename("ARLENE"), "ARLENE");
    }

    #[test]
    fn test_last_path_segment() {
        assert_eq!(
            last_path_segment("https://www.nhc.noaa.gov/archive/2011/al01/al012011.fstadv.001.shtml?"),
            Some("al012011.fstadv.001.shtml".to_string())
        );
        assert_eq!(
            last_path_segment("archive/mar/MAL0198.001"),
            Some("MAL0198.001".to_string())
        );
        assert_eq!(last_path_segment("https://www.nhc.noaa.gov/"), None);
    }
}
