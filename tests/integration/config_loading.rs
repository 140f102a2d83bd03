//! Integration tests for reading the tests ConfigMap from disk
//! Covers both decode stages against a chart-shaped file

use smoketest_config::{ConfigMap, SmoketestError, count_workers_needed};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TESTS_CONFIG_MAP: &str = r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: pravega-smoketest-tests
  labels:
    app: pravega-smoketest
data:
  small-scale: |-
    {
      "type": "Pravega",
      "minutes": 1440,
      "scope": "smoketest",
      "tasks": [
        { "numWriters": 1, "stream": "small", "duplicates": 3 },
        { "numReaders": 2, "stream": "small", "readerGroup": "small-rg" }
      ],
      "smoketestAssertions": { "minWriteRate": 10 }
    }
  large-scale: |-
    {
      "type": "Pravega",
      "forever": true,
      "tasks": [
        { "numWriters": 4, "duplicates": 10 },
        { "numReaders": 4, "duplicates": 10 },
        { "numForgetfulReaders": 1 }
      ]
    }
"#;

fn chart_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let templates = dir.path().join("charts/pravega-smoketest/templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(
        templates.join("pravega-smoketest-tests.yaml"),
        TESTS_CONFIG_MAP,
    )
    .unwrap();
    dir
}

fn config_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join(smoketest_config::DEFAULT_CONFIG_PATH)
}

#[test]
fn test_count_workers_for_each_test() {
    let dir = chart_dir();
    let path = config_path(&dir);

    assert_eq!(count_workers_needed(&path, "small-scale").unwrap(), 4);
    assert_eq!(count_workers_needed(&path, "large-scale").unwrap(), 21);
}

#[test]
fn test_config_map_lists_tests() {
    let dir = chart_dir();
    let map = ConfigMap::load(&config_path(&dir)).unwrap();

    let names: Vec<&str> = map.test_names().collect();
    assert_eq!(names, ["large-scale", "small-scale"]);
    assert_eq!(map.path(), config_path(&dir));
}

#[test]
fn test_missing_test_reports_path() {
    let dir = chart_dir();
    let path = config_path(&dir);

    let error = count_workers_needed(&path, "missing-test").unwrap_err();
    assert!(matches!(error, SmoketestError::TestNotFound { .. }));
    assert!(error.to_string().contains("pravega-smoketest-tests.yaml"));
}

#[test]
fn test_yaml_and_json_failures_are_distinct() {
    let dir = TempDir::new().unwrap();

    let bad_yaml = dir.path().join("bad-yaml.yaml");
    fs::write(&bad_yaml, "data: {unclosed\n").unwrap();
    let error = count_workers_needed(&bad_yaml, "small-scale").unwrap_err();
    assert_eq!(error.code(), "ERR_CONFIG_YAML");

    let bad_json = dir.path().join("bad-json.yaml");
    fs::write(&bad_json, "data:\n  small-scale: 'not json'\n").unwrap();
    let error = count_workers_needed(&bad_json, "small-scale").unwrap_err();
    assert_eq!(error.code(), "ERR_TEST_JSON");
}

#[test]
fn test_missing_file() {
    let error = count_workers_needed(Path::new("does/not/exist.yaml"), "small-scale").unwrap_err();
    assert_eq!(error.code(), "ERR_CONFIG_READ");
}
