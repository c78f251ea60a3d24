//! Line definition loading tests

use std::path::PathBuf;
use transit_sim::simulation::{
    JsonLineDirectory, LineDefinition, LineSource, RouteError, SimConfig, StaticLineSource, Stop,
    VehicleKind,
};

/// Fresh scratch directory for one test
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "transit_sim_{}_{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

const LINE_2: &str = r#"{
    "id": "2",
    "description": "Main Station > University",
    "stops": [
        {"name": "Main Station", "minutes": 0, "audio": "main_station"},
        {"name": "Theatre", "minutes": 3, "audio": "theatre"},
        {"name": "University", "minutes": 9, "audio": "university"}
    ]
}"#;

#[test]
fn test_load_json_line() {
    let dir = scratch_dir("load");
    std::fs::write(dir.join("2.json"), LINE_2).expect("write line");

    let line = JsonLineDirectory::new(&dir).load("2").expect("line loads");
    assert_eq!(line.id, "2");
    assert_eq!(line.stops.len(), 3);
    assert_eq!(line.stops[1], Stop::new("Theatre", 3.0, "theatre"));
}

#[test]
fn test_legacy_distance_field_and_missing_id() {
    let dir = scratch_dir("legacy");
    std::fs::write(
        dir.join("14.json"),
        r#"{"stops": [{"name": "Depot", "distance": 0}, {"name": "Zoo", "distance": 6.5, "audio": "zoo"}]}"#,
    )
    .expect("write line");

    let line = JsonLineDirectory::new(&dir).load("14").expect("line loads");
    assert_eq!(line.id, "14");
    assert_eq!(line.description, "");
    assert_eq!(line.stops[0].audio_key, "");
    assert_eq!(line.stops[1].minutes, 6.5);
}

#[test]
fn test_missing_line_is_not_found() {
    let dir = scratch_dir("missing");
    let source = JsonLineDirectory::new(&dir);

    assert!(matches!(
        source.load("99"),
        Err(RouteError::LineNotFound { line_id }) if line_id == "99"
    ));
    assert!(matches!(
        source.load("../2"),
        Err(RouteError::LineNotFound { .. })
    ));
}

#[test]
fn test_malformed_line() {
    let dir = scratch_dir("malformed");
    std::fs::write(dir.join("5.json"), "{ not json").expect("write line");

    let result = JsonLineDirectory::new(&dir).load("5");
    assert!(matches!(result, Err(RouteError::Malformed { .. })));
}

#[test]
fn test_list_sorts_and_skips_bad_files() {
    let dir = scratch_dir("list");
    std::fs::write(dir.join("2.json"), LINE_2).expect("write line");
    std::fs::write(
        dir.join("11.json"),
        r#"{"id": "11", "description": "Airport > Harbour", "stops": []}"#,
    )
    .expect("write line");
    std::fs::write(dir.join("broken.json"), "[").expect("write line");
    std::fs::write(dir.join("notes.txt"), "ignored").expect("write notes");

    let ids: Vec<String> = JsonLineDirectory::new(&dir)
        .list()
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec!["11", "2"]);
}

#[test]
fn test_static_source() {
    let source = StaticLineSource::new()
        .with_line(LineDefinition::new("3", "North > South", vec![]))
        .with_line(LineDefinition::new("1", "", vec![]));

    assert!(source.load("3").is_ok());
    assert!(matches!(source.load("4"), Err(RouteError::LineNotFound { .. })));
    let ids: Vec<String> = source.list().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[test]
fn test_terminal_names() {
    let line = LineDefinition::new("2", "Main Station > University", vec![]);
    assert_eq!(line.terminal_names(), Some(("Main Station", "University")));

    for description in ["", "Circular", "A > B > C", " > B"] {
        let line = LineDefinition::new("x", description, vec![]);
        assert_eq!(line.terminal_names(), None, "{description:?}");
    }
}

#[test]
fn test_config_file_overrides_and_validation() {
    let dir = scratch_dir("config");
    let path = dir.join("engine.json");
    std::fs::write(
        &path,
        r#"{"time_scale": 4.0, "vehicle_kind": "trolleybus", "next_stop_announce_fraction": 1.5}"#,
    )
    .expect("write config");

    let config = SimConfig::load(&path).expect("config loads");
    assert_eq!(config.time_scale, 4.0);
    assert_eq!(config.vehicle_kind, VehicleKind::Trolleybus);
    // Out of range values fall back to defaults
    assert_eq!(config.next_stop_announce_fraction, 0.25);
    assert_eq!(config.min_dwell_secs, SimConfig::default().min_dwell_secs);

    assert!(SimConfig::load(&dir.join("absent.json")).is_err());
}

#[test]
fn test_validate_repairs_bad_values() {
    let config = SimConfig {
        time_scale: -1.0,
        repair_min_secs: 90.0,
        repair_max_secs: 30.0,
        min_dwell_secs: f64::NAN,
        ..SimConfig::default()
    }
    .validate();

    let defaults = SimConfig::default();
    assert_eq!(config.time_scale, defaults.time_scale);
    assert_eq!(config.repair_min_secs, defaults.repair_min_secs);
    assert_eq!(config.repair_max_secs, defaults.repair_max_secs);
    assert_eq!(config.min_dwell_secs, defaults.min_dwell_secs);
}
