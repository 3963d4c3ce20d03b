use std::fs;
use std::path::PathBuf;

use fctp_core::{load_config_from_path, reference, FctpError, RunConfig};
use tempfile::tempdir;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(relative)
}

#[test]
fn test_reference_yaml_matches_builtin_instance() {
    let config = load_config_from_path(&repo_path("test_data/fctp_4x3.yaml")).unwrap();
    let instance = config.to_instance().unwrap();
    assert_eq!(instance, reference::four_by_three().unwrap());
    assert_eq!(config.max_iterations, 10);
    assert_eq!(config.penalty_cost, 1000.0);
}

#[test]
fn test_json_config_loads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{
            "capacities": {"i1": 100},
            "demands": {"j1": 100},
            "fixed_costs": {"i1": {"j1": 10}},
            "unit_costs": {"i1": {"j1": 1}},
            "max_iterations": 4
        }"#,
    )
    .unwrap();

    let config = load_config_from_path(&path).unwrap();
    assert_eq!(config.max_iterations, 4);
    assert_eq!(config.to_instance().unwrap(), reference::single_arc().unwrap());
}

#[test]
fn test_unknown_extension_falls_back_to_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.cfg");
    let config = RunConfig::from_instance(&reference::single_arc().unwrap());
    fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

    let loaded = load_config_from_path(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_yaml_round_trip_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.yaml");
    let config = RunConfig::from_instance(&reference::four_by_three().unwrap());
    fs::write(&path, config.to_yaml_string().unwrap()).unwrap();

    let loaded = load_config_from_path(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_negative_demand_names_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(
        &path,
        "capacities: {i1: 10}\n\
         demands: {j1: -4}\n\
         fixed_costs: {i1: {j1: 1}}\n\
         unit_costs: {i1: {j1: 1}}\n",
    )
    .unwrap();

    let err = load_config_from_path(&path)
        .unwrap()
        .to_instance()
        .unwrap_err();
    assert_eq!(err.field(), Some("demands.j1"));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_config_from_path(&repo_path("test_data/does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, FctpError::Io(_)));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{ \"capacities\": ").unwrap();
    let err = load_config_from_path(&path).unwrap_err();
    assert!(matches!(err, FctpError::Parse(_)));
}
