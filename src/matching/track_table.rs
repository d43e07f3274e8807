//! IBTrACS-style track table loading
//!
//! The table is read with the `csv` crate and deserialized row by row.
//! Numeric cells are lenient: blanks and unit placeholders become `None`
//! rather than failing the whole file.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::utils::error::StorageError;

/// `iso_time` formats accepted, tried in order
const ISO_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// One fix of the track table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackFix {
    #[serde(rename = "SID", alias = "sid")]
    pub sid: String,
    #[serde(rename = "NAME", alias = "name", default)]
    pub name: String,
    #[serde(rename = "ISO_TIME", alias = "iso_time", default)]
    pub iso_time: String,
    #[serde(rename = "LAT", alias = "lat", default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(rename = "LON", alias = "lon", default, deserialize_with = "lenient_f64")]
    pub lon: Option<f64>,
    #[serde(rename = "WMO_WIND", alias = "wmo_wind", default, deserialize_with = "lenient_f64")]
    pub wmo_wind: Option<f64>,
    #[serde(rename = "WMO_PRES", alias = "wmo_pres", default, deserialize_with = "lenient_f64")]
    pub wmo_pres: Option<f64>,
    #[serde(rename = "SEASON", alias = "season", default, deserialize_with = "lenient_i32")]
    pub season: Option<i32>,
}

impl TrackFix {
    /// Parsed `iso_time`, if it matches a known format
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_iso_time(&self.iso_time)
    }

    /// Year of `iso_time`
    pub fn year(&self) -> Option<i32> {
        self.timestamp().map(|ts| ts.year())
    }
}

/// Parse an `iso_time` cell
pub fn parse_iso_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ISO_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite()))
}

fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_whole_i32))
}

/// Parse `2011` or `2011.0`; fractions and out-of-range values give `None`
fn parse_whole_i32(value: &str) -> Option<i32> {
    let value = value.trim();
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if !fraction.bytes().all(|b| b == b'0') {
        return None;
    }
    whole.parse::<i32>().ok()
}

/// Track table loaded into memory, in file order
#[derive(Debug, Clone, Default)]
pub struct TrackTable {
    pub fixes: Vec<TrackFix>,
}

impl TrackTable {
    /// Load a track table from a CSV file
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be opened, or
    /// `StorageError::Csv` if a row is structurally malformed
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let file = std::fs::File::open(path).map_err(|e| StorageError::io(path, e))?;
        let table = Self::from_reader(file)?;
        tracing::info!(path = %path.display(), rows = table.fixes.len(), "Loaded track table");
        Ok(table)
    }

    /// Read a track table from any CSV source
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Csv` if a row is structurally malformed
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, StorageError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut fixes = Vec::new();
        for result in rdr.deserialize() {
            let fix: TrackFix = result?;
            fixes.push(fix);
        }

        Ok(Self { fixes })
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
SID,SEASON,NAME,ISO_TIME,LAT,LON,WMO_WIND,WMO_PRES
2011233N15301,2011,IRENE,2011-08-20 18:00:00,15.0,-59.0,40,1006
2011233N15301,2011,IRENE,2011-08-21 00:00:00,16.0,-60.6, ,1006
2011233N15301,2011,IRENE,not a time,,,,
";

    #[test]
    fn test_lenient_numeric_cells() {
        let table = TrackTable::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.fixes[0].lat, Some(15.0));
        assert_eq!(table.fixes[0].season, Some(2011));
        assert_eq!(table.fixes[1].wmo_wind, None);
        assert_eq!(table.fixes[2].lat, None);
        assert_eq!(table.fixes[2].year(), None);
    }

    #[test]
    fn test_lowercase_headers() {
        let csv = "sid,name,iso_time,lat,lon\nX,BERYL,2024-07-01 06:00,11.0,-50.0\n";
        let table = TrackTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.fixes[0].name, "BERYL");
        assert_eq!(table.fixes[0].year(), Some(2024));
        assert_eq!(table.fixes[0].season, None);
    }

    #[test]
    fn test_season_rejects_fractions_and_overflow() {
        assert_eq!(parse_whole_i32(" 2011 "), Some(2011));
        assert_eq!(parse_whole_i32("2011.0"), Some(2011));
        assert_eq!(parse_whole_i32("2011.5"), None);
        assert_eq!(parse_whole_i32("1e12"), None);
        assert_eq!(parse_whole_i32("99999999999"), None);
        assert_eq!(parse_whole_i32("Year"), None);

        let csv = "SID,SEASON,ISO_TIME
A,2011.0,2011-08-20 18:00:00
B,3000000000,2011-08-20 18:00:00
";
        let table = TrackTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.fixes[0].season, Some(2011));
        assert_eq!(table.fixes[1].season, None);
    }

    #[test]
    fn test_parse_iso_time_formats() {
        assert!(parse_iso_time("2024-07-01 06:00:00").is_some());
        assert!(parse_iso_time("2024-07-01T06:00:00").is_some());
        assert!(parse_iso_time("2024-07-01 06:00").is_some());
        assert!(parse_iso_time("07/01/2024").is_none());
        assert!(parse_iso_time("").is_none());
    }
}
