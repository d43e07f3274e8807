//! Track kinematics tests: great-circle math and track extraction

use proptest::prelude::*;
use stormtrack::matching::{MatchedStorm, TrackTable};
use stormtrack::tracks::{extract_tracks, haversine_distance, initial_bearing, write_tracks_csv};
use tempfile::TempDir;

const TRACK_TABLE: &str = "\
SID,SEASON,NAME,ISO_TIME,LAT,LON,WMO_WIND,WMO_PRES
2011233N15301,2011,IRENE,2011-08-21 06:00:00,16.0,-60.0,45,1002
2011233N15301,2011,IRENE,2011-08-21 00:00:00,15.0,-59.0,40,1005
2011233N15301,2011,IRENE,2011-08-21 12:00:00,,,50,999
2011178N19263,2011,ARLENE,2011-06-28 12:00:00,19.0,-93.0,35,1002
2011178N19263,2011,ARLENE,2011-06-28 18:00:00,19.0,-93.0,40,1000
2011236N14290,2011,JOSE,2011-08-28 00:00:00,30.0,-65.0,30,1010
";

fn matched(sid: &str, name: &str) -> MatchedStorm {
    MatchedStorm {
        ibtracs_sid: sid.to_string(),
        ibtracs_name: name.to_string(),
        year: 2011,
        season: Some(2011),
        start_time: String::new(),
        end_time: String::new(),
        noaa_basin: "Atlantic".to_string(),
        noaa_name: name.to_string(),
        noaa_path: format!("noaa_complete/2011/Atlantic/{name}"),
        has_advisory: true,
        has_discussion: true,
    }
}

#[test]
fn test_antipodal_distance_is_half_circumference() {
    let distance = haversine_distance(0.0, 0.0, 0.0, 180.0);
    assert!((distance - 20015.0).abs() < 1.0, "{distance}");
}

#[test]
fn test_same_point_is_zero() {
    assert_eq!(haversine_distance(25.5, -80.2, 25.5, -80.2), 0.0);
}

#[test]
fn test_cardinal_bearings() {
    assert!((initial_bearing(0.0, 0.0, 1.0, 0.0) - 0.0).abs() < 1e-9);
    assert!((initial_bearing(0.0, 0.0, 0.0, 1.0) - 90.0).abs() < 1e-9);
    assert!((initial_bearing(1.0, 0.0, 0.0, 0.0) - 180.0).abs() < 1e-9);
    assert!((initial_bearing(0.0, 1.0, 0.0, 0.0) - 270.0).abs() < 1e-9);
}

proptest! {
    #[test]
    fn prop_bearing_in_range(
        lat1 in -89.0f64..89.0, lon1 in -180.0f64..180.0,
        lat2 in -89.0f64..89.0, lon2 in -180.0f64..180.0,
    ) {
        let bearing = initial_bearing(lat1, lon1, lat2, lon2);
        prop_assert!((0.0..360.0).contains(&bearing), "{}", bearing);
    }

    #[test]
    fn prop_haversine_symmetric(
        lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
        lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
    ) {
        let there = haversine_distance(lat1, lon1, lat2, lon2);
        let back = haversine_distance(lat2, lon2, lat1, lon1);
        prop_assert!(there >= 0.0);
        prop_assert!((there - back).abs() < 1e-6);
    }
}

#[test]
fn test_extract_tracks_orders_and_derives_movement() {
    let table = TrackTable::from_reader(TRACK_TABLE.as_bytes()).unwrap();
    let rows = extract_tracks(
        &table,
        &[matched("2011233N15301", "IRENE"), matched("2011178N19263", "ARLENE")],
    );

    // JOSE is unmatched
    assert_eq!(rows.len(), 5);

    let order: Vec<_> = rows
        .iter()
        .map(|r| (r.storm_name.as_str(), r.datetime.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("ARLENE", "2011-06-28 12:00:00"),
            ("ARLENE", "2011-06-28 18:00:00"),
            ("IRENE", "2011-08-21 00:00:00"),
            ("IRENE", "2011-08-21 06:00:00"),
            ("IRENE", "2011-08-21 12:00:00"),
        ]
    );

    // Stationary between fixes
    assert_eq!(rows[0].storm_speed, None);
    assert_eq!(rows[1].storm_speed, Some(0.0));

    let irene_first = &rows[2];
    assert_eq!(irene_first.storm_speed, None);
    assert_eq!(irene_first.storm_direction, None);
    assert_eq!(irene_first.hour, Some(0));

    let irene_second = &rows[3];
    let speed = irene_second.storm_speed.unwrap();
    let expected = haversine_distance(15.0, -59.0, 16.0, -60.0) / 6.0;
    assert!((speed - expected).abs() < 1e-9);
    let direction = irene_second.storm_direction.unwrap();
    assert!(direction > 270.0 && direction < 360.0, "{direction}");

    // Missing coordinates give null movement
    assert_eq!(rows[4].storm_speed, None);
    assert_eq!(rows[4].latitude, None);
    assert_eq!(rows[4].noaa_basin, "Atlantic");
}

#[test]
fn test_duplicate_sid_uses_first_match() {
    let table = TrackTable::from_reader(TRACK_TABLE.as_bytes()).unwrap();
    let mut second = matched("2011178N19263", "ARLENE_AGAIN");
    second.noaa_basin = "E_Pacific".to_string();

    let rows = extract_tracks(&table, &[matched("2011178N19263", "ARLENE"), second]);

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.noaa_name == "ARLENE"));
    assert!(rows.iter().all(|r| r.noaa_basin == "Atlantic"));
}

#[test]
fn test_tracks_csv_header() {
    let temp = TempDir::new().unwrap();
    let table = TrackTable::from_reader(TRACK_TABLE.as_bytes()).unwrap();
    let rows = extract_tracks(&table, &[matched("2011178N19263", "ARLENE")]);

    let path = temp.path().join("matched_cyclone_tracks.csv");
    write_tracks_csv(&path, &rows).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "storm_id,storm_name,season,datetime,year,month,day,hour,latitude,longitude,\
         max_wind_wmo,min_pressure_wmo,max_wind_usa,min_pressure_usa,storm_speed,\
         storm_direction,distance_to_land,noaa_name,noaa_basin"
    );
    assert_eq!(lines.count(), 2);
}
