//! Summary statistics over extracted track rows

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::tracks::TrackRow;

/// Coverage and movement statistics of a track table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackSummary {
    pub total_records: usize,
    pub storm_count: usize,
    /// Distinct storms per fix year
    pub storms_per_year: BTreeMap<i32, usize>,
    /// Distinct storms per NOAA basin
    pub storms_per_basin: BTreeMap<String, usize>,
    pub wind_available: usize,
    pub pressure_available: usize,
    pub speed_available: usize,
    pub direction_available: usize,
    pub mean_speed: Option<f64>,
    pub median_speed: Option<f64>,
    pub max_speed: Option<f64>,
}

impl TrackSummary {
    pub fn from_rows(rows: &[TrackRow]) -> Self {
        let mut storms = BTreeSet::new();
        let mut per_year: BTreeMap<i32, BTreeSet<&str>> = BTreeMap::new();
        let mut per_basin: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
        let mut speeds = Vec::new();

        for row in rows {
            storms.insert(row.storm_id.as_str());
            if let Some(year) = row.year {
                per_year.entry(year).or_default().insert(&row.storm_id);
            }
            if !row.noaa_basin.is_empty() {
                per_basin
                    .entry(row.noaa_basin.clone())
                    .or_default()
                    .insert(&row.storm_id);
            }
            if let Some(speed) = row.storm_speed {
                speeds.push(speed);
            }
        }

        speeds.sort_by(f64::total_cmp);

        Self {
            total_records: rows.len(),
            storm_count: storms.len(),
            storms_per_year: per_year.into_iter().map(|(k, v)| (k, v.len())).collect(),
            storms_per_basin: per_basin.into_iter().map(|(k, v)| (k, v.len())).collect(),
            wind_available: rows.iter().filter(|r| r.max_wind_wmo.is_some()).count(),
            pressure_available: rows.iter().filter(|r| r.min_pressure_wmo.is_some()).count(),
            speed_available: speeds.len(),
            direction_available: rows.iter().filter(|r| r.storm_direction.is_some()).count(),
            mean_speed: mean(&speeds),
            median_speed: median(&speeds),
            max_speed: speeds.last().copied(),
        }
    }

    /// Fraction of records carrying a value
    pub fn ratio(&self, available: usize) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        available as f64 / self.total_records as f64
    }

    /// Emit the summary through tracing
    pub fn log(&self) {
        tracing::info!(
            records = self.total_records,
            storms = self.storm_count,
            wind = %format!("{:.1}%", self.ratio(self.wind_available) * 100.0),
            pressure = %format!("{:.1}%", self.ratio(self.pressure_available) * 100.0),
            speed = %format!("{:.1}%", self.ratio(self.speed_available) * 100.0),
            direction = %format!("{:.1}%", self.ratio(self.direction_available) * 100.0),
            "Track data coverage"
        );
        for (year, count) in &self.storms_per_year {
            tracing::info!(year, storms = count, "Storms per year");
        }
        for (basin, count) in &self.storms_per_basin {
            tracing::info!(basin = %basin, storms = count, "Storms per basin");
        }
        if let (Some(mean), Some(median), Some(max)) =
            (self.mean_speed, self.median_speed, self.max_speed)
        {
            tracing::info!(mean, median, max, "Storm speed km/h");
        }
    }
}

fn mean(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    Some(sorted.iter().sum::<f64>() / sorted.len() as f64)
}

fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sid: &str, year: i32, basin: &str, speed: Option<f64>) -> TrackRow {
        TrackRow {
            storm_id: sid.into(),
            storm_name: String::new(),
            season: Some(year),
            datetime: String::new(),
            year: Some(year),
            month: None,
            day: None,
            hour: None,
            latitude: None,
            longitude: None,
            max_wind_wmo: Some(35.0),
            min_pressure_wmo: None,
            max_wind_usa: None,
            min_pressure_usa: None,
            storm_speed: speed,
            storm_direction: speed.map(|_| 90.0),
            distance_to_land: None,
            noaa_name: String::new(),
            noaa_basin: basin.into(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let rows = vec![
            row("A", 2011, "Atlantic", None),
            row("A", 2011, "Atlantic", Some(10.0)),
            row("B", 2011, "E_Pacific", Some(30.0)),
            row("C", 2012, "Atlantic", Some(20.0)),
        ];

        let summary = TrackSummary::from_rows(&rows);
        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.storm_count, 3);
        assert_eq!(summary.storms_per_year[&2011], 2);
        assert_eq!(summary.storms_per_basin["Atlantic"], 2);
        assert_eq!(summary.speed_available, 3);
        assert_eq!(summary.mean_speed, Some(20.0));
        assert_eq!(summary.median_speed, Some(20.0));
        assert_eq!(summary.max_speed, Some(30.0));
        assert!((summary.ratio(summary.wind_available) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_summary() {
        let summary = TrackSummary::from_rows(&[]);
        assert_eq!(summary.storm_count, 0);
        assert_eq!(summary.mean_speed, None);
        assert_eq!(summary.ratio(0), 0.0);
    }
}
