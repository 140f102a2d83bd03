//! Integration tests for config + deployer
//! Uses a recording runner in place of helm

use smoketest_config::SmoketestError;
use smoketest_deployer::{DeployOptions, Deployer, DeployerSettings, RecordingRunner};
use std::fs;
use tempfile::TempDir;

const TESTS_CONFIG_MAP: &str = r#"kind: ConfigMap
data:
  small-scale: '{"tasks": [{"duplicates": 3}, {}]}'
  empty: '{"tasks": []}'
"#;

fn settings(dir: &TempDir) -> DeployerSettings {
    let config_path = dir.path().join("pravega-smoketest-tests.yaml");
    fs::write(&config_path, TESTS_CONFIG_MAP).unwrap();
    DeployerSettings {
        config_path,
        ..DeployerSettings::default()
    }
}

#[test]
fn test_deploy_small_scale() {
    let dir = TempDir::new().unwrap();
    let mut deployer = Deployer::new(settings(&dir), RecordingRunner::new());

    deployer.deploy(&DeployOptions::new("small-scale")).unwrap();

    let calls = deployer.runner().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][1], "install");
    assert_eq!(calls[0][4], "pravega-smoketest-small-scale");
    assert_eq!(
        calls[0].last().unwrap(),
        "pravega_smoketest_test.test_name_kebab=small-scale,pravega_smoketest_test.num_workers=4"
    );
}

#[test]
fn test_deploy_empty_test_has_no_workers() {
    let dir = TempDir::new().unwrap();
    let mut deployer = Deployer::new(settings(&dir), RecordingRunner::new());

    deployer.deploy(&DeployOptions::new("empty")).unwrap();

    let overrides = deployer.runner().calls()[0].last().unwrap().clone();
    assert!(overrides.ends_with("num_workers=0"));
}

#[test]
fn test_deploy_controller_uri_only() {
    let dir = TempDir::new().unwrap();
    let mut deployer = Deployer::new(settings(&dir), RecordingRunner::new());

    let options = DeployOptions::new("small-scale").with_controller_uri("tcp://10.0.0.5:9090");
    deployer.deploy(&options).unwrap();

    let overrides = deployer.runner().calls()[0].last().unwrap().clone();
    assert!(overrides.ends_with(",pravega_smoketest_test.controller_uri=tcp://10.0.0.5:9090"));
    assert!(!overrides.contains("image."));
}

#[test]
fn test_deploy_missing_test_then_destroy() {
    let dir = TempDir::new().unwrap();
    let mut deployer = Deployer::new(settings(&dir), RecordingRunner::new());

    let result = deployer.deploy(&DeployOptions::new("missing-test"));
    assert!(matches!(result, Err(SmoketestError::TestNotFound { .. })));
    assert!(deployer.runner().calls().is_empty());

    deployer.destroy("missing-test").unwrap();
    assert_eq!(
        deployer.runner().calls(),
        &[vec![
            "helm".to_string(),
            "delete".to_string(),
            "--purge".to_string(),
            "pravega-smoketest-missing-test".to_string(),
        ]]
    );
}

#[test]
fn test_deploy_then_destroy_same_release() {
    let dir = TempDir::new().unwrap();
    let mut deployer = Deployer::new(settings(&dir), RecordingRunner::new());

    deployer.deploy(&DeployOptions::default()).unwrap();
    deployer.destroy("small-scale").unwrap();

    let calls = deployer.runner().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0][4], calls[1][3]);
}
