//! Track-table matching and forecast export over a temporary product tree

mod common;

use common::write_file;
use stormtrack::matching::forecasts::export_forecasts;
use stormtrack::matching::query::{ForecastBundle, HitKind, SearchScope, StormFilter};
use stormtrack::matching::{
    group_track_table, match_storms, read_matched_csv, scan_storm_directory, write_matched_csv,
    TrackTable,
};
use tempfile::TempDir;

const TRACK_TABLE: &str = "\
SID,SEASON,NAME,ISO_TIME,LAT,LON,WMO_WIND,WMO_PRES
2024181N09320,2024,BERYL,2024-06-28 12:00:00,9.5,-41.0,30,1007
2024181N09320,2024,BERYL,2024-06-28 06:00:00,9.3,-40.2,25,1008
2024185N15254,2024,ALETTA,2024-07-04 00:00:00,15.9,-104.5,30,1006
2024193N30283,2024,CHRIS,2024-07-01 00:00:00,20.1,-96.0,,
";

fn product_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write_file(
        root,
        "2024/Atlantic/BERYL/forecast_advisory/al022024.fstadv.001.txt",
        "HURRICANE BERYL FORECAST/ADVISORY NUMBER   1\n1500 UTC FRI JUN 28 2024\n",
    );
    write_file(
        root,
        "2024/Atlantic/BERYL/forecast_discussion/al022024.discus.001.txt",
        "TROPICAL DEPRESSION TWO DISCUSSION NUMBER   1\n",
    );
    // Public advisories alone do not qualify a storm
    write_file(
        root,
        "2024/Atlantic/CHRIS/public_advisory/al032024.public.001.txt",
        "TROPICAL STORM CHRIS",
    );
    write_file(
        root,
        "2023/Atlantic/BERYL/forecast_advisory/al022023.fstadv.001.txt",
        "no 2023 BERYL in the table",
    );
    write_file(
        root,
        "2024/E_Pacific/Tropical Storm ALETTA/forecast_discussion/ep012024.discus.001.txt",
        "TROPICAL STORM ALETTA DISCUSSION NUMBER   3\n",
    );

    temp
}

#[test]
fn test_scan_skips_storms_without_forecast_products() {
    let temp = product_tree();
    let storms = scan_storm_directory(temp.path()).unwrap();

    let names: Vec<_> = storms
        .iter()
        .map(|s| (s.year, s.storm_name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            (2023, "BERYL"),
            (2024, "BERYL"),
            (2024, "TROPICAL STORM ALETTA"),
        ]
    );
    assert!(storms[1].has_advisory && storms[1].has_discussion);
    assert!(!storms[2].has_advisory && storms[2].has_discussion);
}

#[test]
fn test_group_track_table_spans_fixes() {
    let table = TrackTable::from_reader(TRACK_TABLE.as_bytes()).unwrap();
    let groups = group_track_table(&table);

    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].name, "BERYL");
    assert_eq!(groups[0].season, Some(2024));
    assert_eq!(groups[0].start_time, "2024-06-28 06:00:00");
    assert_eq!(groups[0].end_time, "2024-06-28 12:00:00");
}

#[test]
fn test_match_pairs_by_year_and_name() {
    let temp = product_tree();
    let table = TrackTable::from_reader(TRACK_TABLE.as_bytes()).unwrap();

    let matched = match_storms(
        &group_track_table(&table),
        &scan_storm_directory(temp.path()).unwrap(),
    );

    assert_eq!(matched.len(), 2);
    assert_eq!(matched[0].ibtracs_sid, "2024181N09320");
    assert_eq!(matched[0].noaa_basin, "Atlantic");
    assert_eq!(matched[0].year, 2024);

    assert_eq!(matched[1].ibtracs_name, "ALETTA");
    assert_eq!(matched[1].noaa_name, "TROPICAL STORM ALETTA");
    assert!(matched[1].noaa_path.ends_with("Tropical Storm ALETTA"));
    assert_eq!(matched[1].noaa_basin, "E_Pacific");
    assert!(!matched[1].has_advisory);
}

#[test]
fn test_matched_csv_round_trip() {
    let temp = product_tree();
    let table = TrackTable::from_reader(TRACK_TABLE.as_bytes()).unwrap();
    let matched = match_storms(
        &group_track_table(&table),
        &scan_storm_directory(temp.path()).unwrap(),
    );

    let out = temp.path().join("processed").join("matched_cyclones.csv");
    write_matched_csv(&out, &matched).unwrap();

    let header = std::fs::read_to_string(&out).unwrap();
    assert!(header.starts_with(
        "ibtracs_sid,ibtracs_name,year,season,start_time,end_time,noaa_basin,noaa_name,noaa_path,has_advisory,has_discussion"
    ));

    assert_eq!(read_matched_csv(&out).unwrap(), matched);
}

#[test]
fn test_export_forecast_bundle() {
    let temp = product_tree();
    let table = TrackTable::from_reader(TRACK_TABLE.as_bytes()).unwrap();
    let matched = match_storms(
        &group_track_table(&table),
        &scan_storm_directory(temp.path()).unwrap(),
    );

    let out = temp.path().join("processed").join("cyclone_forecasts.json");
    assert_eq!(export_forecasts(&matched, &out).unwrap(), 2);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();

    let beryl = &json["2024_Atlantic_BERYL"];
    assert_eq!(beryl["ibtracs_sid"], "2024181N09320");
    assert_eq!(beryl["forecasts"].as_array().unwrap().len(), 1);
    assert_eq!(beryl["forecasts"][0]["filename"], "al022024.fstadv.001.txt");
    assert!(beryl["forecasts"][0]["content"]
        .as_str()
        .unwrap()
        .starts_with("HURRICANE BERYL FORECAST/ADVISORY"));
    assert!(beryl["forecasts"][0].get("file").is_none());
    assert_eq!(beryl["forecasts"][0]["timestamp"], "1500 UTC FRI JUN 28 2024");
    assert_eq!(beryl["discussions"].as_array().unwrap().len(), 1);

    let aletta = &json["2024_E_Pacific_TROPICAL STORM ALETTA"];
    assert!(aletta["forecasts"].as_array().unwrap().is_empty());
    assert_eq!(aletta["discussions"][0]["timestamp"], "");
}

// ============================================================================
// Forecast bundle queries
// ============================================================================

fn exported_bundle(temp: &TempDir) -> ForecastBundle {
    let table = TrackTable::from_reader(TRACK_TABLE.as_bytes()).unwrap();
    let matched = match_storms(
        &group_track_table(&table),
        &scan_storm_directory(temp.path()).unwrap(),
    );

    let out = temp.path().join("processed").join("cyclone_forecasts.json");
    export_forecasts(&matched, &out).unwrap();
    ForecastBundle::load(&out).unwrap()
}

#[test]
fn test_query_lists_and_counts_exported_storms() {
    let temp = product_tree();
    let bundle = exported_bundle(&temp);

    let keys: Vec<_> = bundle.storm_keys().collect();
    assert_eq!(
        keys,
        vec!["2024_Atlantic_BERYL", "2024_E_Pacific_TROPICAL STORM ALETTA"]
    );

    let stats = bundle.statistics();
    assert_eq!(stats.total_storms, 2);
    assert_eq!(stats.total_forecasts, 1);
    assert_eq!(stats.total_discussions, 2);
    assert_eq!(stats.years.get(&2024), Some(&2));
    assert_eq!(stats.basins.get("E_Pacific"), Some(&1));

    let beryl = bundle.get("2024_Atlantic_BERYL").unwrap();
    assert_eq!(beryl.ibtracs_sid, "2024181N09320");
    assert_eq!(beryl.forecasts[0].filename, "al022024.fstadv.001.txt");
}

#[test]
fn test_query_filters_by_name_year_and_basin() {
    let temp = product_tree();
    let bundle = exported_bundle(&temp);

    let by_name = bundle.filter(&StormFilter {
        name: Some("beryl".into()),
        ..StormFilter::default()
    });
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].0, "2024_Atlantic_BERYL");

    // Bare names find storms stored with a category prefix
    let by_bare_name = bundle.filter(&StormFilter {
        name: Some("Aletta".into()),
        ..StormFilter::default()
    });
    assert_eq!(by_bare_name.len(), 1);
    assert_eq!(by_bare_name[0].1.noaa_name, "TROPICAL STORM ALETTA");

    let wrong_year = bundle.filter(&StormFilter {
        name: Some("BERYL".into()),
        year: Some(2023),
        ..StormFilter::default()
    });
    assert!(wrong_year.is_empty());

    let pacific = bundle.filter(&StormFilter {
        basin: Some("E_Pacific".into()),
        ..StormFilter::default()
    });
    assert_eq!(pacific.len(), 1);

    // Basin names are exact
    let lower = bundle.filter(&StormFilter {
        basin: Some("atlantic".into()),
        ..StormFilter::default()
    });
    assert!(lower.is_empty());

    assert_eq!(bundle.filter(&StormFilter::default()).len(), 2);
}

#[test]
fn test_query_keyword_search() {
    let temp = product_tree();
    let bundle = exported_bundle(&temp);

    let results = bundle.search("discussion number", SearchScope::Both, 10);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].storm_key, "2024_Atlantic_BERYL");
    assert_eq!(results[0].matches.len(), 1);
    assert_eq!(results[0].matches[0].kind, HitKind::Discussion);
    assert_eq!(results[0].matches[0].filename, "al022024.discus.001.txt");
    assert_eq!(results[1].storm_name, "TROPICAL STORM ALETTA");
    assert_eq!(results[1].basin, "E_Pacific");

    let advisories = bundle.search("Forecast/Advisory", SearchScope::Forecasts, 10);
    assert_eq!(advisories.len(), 1);
    assert_eq!(advisories[0].matches[0].kind, HitKind::Forecast);
    assert_eq!(advisories[0].matches[0].timestamp, "1500 UTC FRI JUN 28 2024");

    assert!(bundle
        .search("forecast/advisory", SearchScope::Discussions, 10)
        .is_empty());
    assert_eq!(bundle.search("discussion", SearchScope::Both, 1).len(), 1);
    assert!(bundle.search("SANDY", SearchScope::Both, 10).is_empty());

    let json = serde_json::to_value(&advisories).unwrap();
    assert_eq!(json[0]["matches"][0]["type"], "forecast");
    assert_eq!(json[0]["matches"][0]["filename"], "al022024.fstadv.001.txt");
}

#[test]
fn test_query_missing_bundle_is_error() {
    let temp = TempDir::new().unwrap();
    assert!(ForecastBundle::load(&temp.path().join("cyclone_forecasts.json")).is_err());
}
