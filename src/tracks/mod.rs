//! Track kinematics for matched storms
//!
//! Speed and heading between consecutive fixes are derived with the
//! haversine great-circle distance and the initial (forward) bearing.

pub mod summary;

pub use summary::TrackSummary;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::matching::{MatchedStorm, TrackFix, TrackTable};
use crate::utils::error::StorageError;

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two points given in degrees
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Initial bearing from point 1 to point 2, degrees clockwise from north in `[0, 360)`
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
    let dlon = (lon2 - lon1).to_radians();

    let x = dlon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    (x.atan2(y).to_degrees() + 360.0) % 360.0
}

/// Movement from the previous fix to the current one
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Movement {
    /// km/h
    pub speed: Option<f64>,
    /// degrees, clockwise from north
    pub direction: Option<f64>,
}

/// Movement between two fixes
///
/// Null when either fix lacks a coordinate or timestamp, or when no time
/// elapsed between them.
pub fn movement_between(prev: &TrackFix, curr: &TrackFix) -> Movement {
    let (Some(lat1), Some(lon1), Some(lat2), Some(lon2)) = (prev.lat, prev.lon, curr.lat, curr.lon)
    else {
        return Movement::default();
    };
    let (Some(t1), Some(t2)) = (prev.timestamp(), curr.timestamp()) else {
        return Movement::default();
    };

    let hours = (t2 - t1).num_seconds() as f64 / 3600.0;
    if hours <= 0.0 {
        return Movement::default();
    }

    Movement {
        speed: Some(haversine_distance(lat1, lon1, lat2, lon2) / hours),
        direction: Some(initial_bearing(lat1, lon1, lat2, lon2)),
    }
}

/// Movement for each fix of one time-ordered track; the first is always null
pub fn compute_movement(fixes: &[&TrackFix]) -> Vec<Movement> {
    let mut movements = Vec::with_capacity(fixes.len());
    for (i, fix) in fixes.iter().enumerate() {
        if i == 0 {
            movements.push(Movement::default());
        } else {
            movements.push(movement_between(fixes[i - 1], fix));
        }
    }
    movements
}

/// One row of the kinematics table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRow {
    pub storm_id: String,
    pub storm_name: String,
    pub season: Option<i32>,
    pub datetime: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub max_wind_wmo: Option<f64>,
    pub min_pressure_wmo: Option<f64>,
    pub max_wind_usa: Option<f64>,
    pub min_pressure_usa: Option<f64>,
    pub storm_speed: Option<f64>,
    pub storm_direction: Option<f64>,
    pub distance_to_land: Option<f64>,
    pub noaa_name: String,
    pub noaa_basin: String,
}

impl TrackRow {
    fn new(fix: &TrackFix, movement: Movement, noaa_name: &str, noaa_basin: &str) -> Self {
        let timestamp: Option<NaiveDateTime> = fix.timestamp();
        Self {
            storm_id: fix.sid.clone(),
            storm_name: fix.name.clone(),
            season: fix.season,
            datetime: fix.iso_time.clone(),
            year: timestamp.map(|ts| ts.year()),
            month: timestamp.map(|ts| ts.month()),
            day: timestamp.map(|ts| ts.day()),
            hour: timestamp.map(|ts| ts.hour()),
            latitude: fix.lat,
            longitude: fix.lon,
            max_wind_wmo: fix.wmo_wind,
            min_pressure_wmo: fix.wmo_pres,
            max_wind_usa: None,
            min_pressure_usa: None,
            storm_speed: movement.speed,
            storm_direction: movement.direction,
            distance_to_land: None,
            noaa_name: noaa_name.to_string(),
            noaa_basin: noaa_basin.to_string(),
        }
    }
}

/// Track rows of every matched storm, sorted by `(storm_id, datetime)`
///
/// A sid matched more than once takes its NOAA name and basin from the
/// first matched entry.
pub fn extract_tracks(table: &TrackTable, matched: &[MatchedStorm]) -> Vec<TrackRow> {
    let mut noaa_by_sid: HashMap<&str, (&str, &str)> = HashMap::new();
    for storm in matched {
        noaa_by_sid
            .entry(storm.ibtracs_sid.as_str())
            .or_insert((storm.noaa_name.as_str(), storm.noaa_basin.as_str()));
    }

    let mut fixes_by_sid: HashMap<&str, Vec<&TrackFix>> = HashMap::new();
    for fix in &table.fixes {
        if noaa_by_sid.contains_key(fix.sid.as_str()) {
            fixes_by_sid.entry(fix.sid.as_str()).or_default().push(fix);
        }
    }

    let mut rows = Vec::new();
    for (sid, mut fixes) in fixes_by_sid {
        // Stable sort keeps file order among equal or missing timestamps
        fixes.sort_by_key(|fix| {
            let ts = fix.timestamp();
            (ts.is_none(), ts)
        });

        let (noaa_name, noaa_basin) = noaa_by_sid[sid];
        let movements = compute_movement(&fixes);
        rows.extend(
            fixes
                .iter()
                .zip(movements)
                .map(|(fix, movement)| TrackRow::new(fix, movement, noaa_name, noaa_basin)),
        );
    }

    rows.sort_by(|a, b| {
        a.storm_id
            .cmp(&b.storm_id)
            .then_with(|| a.datetime.cmp(&b.datetime))
    });

    tracing::info!(
        storms = noaa_by_sid.len(),
        records = rows.len(),
        "Extracted track rows"
    );
    rows
}

/// Write track rows as CSV
///
/// # Errors
///
/// Returns `StorageError` if the file cannot be created or written
pub fn write_tracks_csv(path: &Path, rows: &[TrackRow]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| StorageError::io(path, e))?;

    Ok(())
}
