//! Smoketest test configuration
//!
//! The smoketest chart ships its tests as a ConfigMap: a YAML document whose
//! `data` mapping holds one JSON document per test, keyed by the test's
//! kebab-case name. Decoding is done in two stages, the outer YAML mapping
//! first and the selected test's JSON second, and each stage fails with its
//! own error kind.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use tracing::debug;

mod error;

pub use error::SmoketestError;

/// Location of the tests ConfigMap, relative to the repository root
pub const DEFAULT_CONFIG_PATH: &str =
    "charts/pravega-smoketest/templates/pravega-smoketest-tests.yaml";

/// Test deployed when none is named
pub const DEFAULT_TEST_NAME: &str = "small-scale";

#[derive(Debug, Deserialize)]
struct RawConfigMap {
    data: BTreeMap<String, serde_yaml::Value>,
}

/// Outer stage: the ConfigMap with its test documents still encoded
#[derive(Debug, Clone)]
pub struct ConfigMap {
    path: PathBuf,
    data: BTreeMap<String, serde_yaml::Value>,
}

impl ConfigMap {
    /// Read and decode the ConfigMap at `path`
    ///
    /// The file is read in full and closed before decoding starts.
    ///
    /// # Errors
    ///
    /// Returns `SmoketestError::ConfigRead` if the file cannot be read and
    /// `SmoketestError::ConfigYaml` if it is not a mapping with a `data` key
    pub fn load(path: &Path) -> Result<Self, SmoketestError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SmoketestError::config_read(path, e))?;
        Self::parse(&content, path)
    }

    /// Decode ConfigMap text; `path` is only used for error reporting
    ///
    /// # Errors
    ///
    /// Returns `SmoketestError::ConfigYaml` if the text is not a mapping with
    /// a `data` key
    pub fn parse(content: &str, path: &Path) -> Result<Self, SmoketestError> {
        let raw: RawConfigMap =
            serde_yaml::from_str(content).map_err(|e| SmoketestError::config_yaml(path, e))?;
        debug!(path = %path.display(), tests = raw.data.len(), "decoded tests config map");
        Ok(Self {
            path: path.to_path_buf(),
            data: raw.data,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of every test in the ConfigMap, in sorted order
    pub fn test_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Inner stage: decode the JSON document stored under `test_name`
    ///
    /// # Errors
    ///
    /// Returns `SmoketestError::TestNotFound` if `data` has no such key,
    /// `SmoketestError::EntryNotString` if the value is not a string, and
    /// `SmoketestError::TestJson` if the string is not a test document
    pub fn test_config(&self, test_name: &str) -> Result<TestConfig, SmoketestError> {
        let entry = self
            .data
            .get(test_name)
            .ok_or_else(|| SmoketestError::test_not_found(test_name, &self.path))?;
        let document = entry
            .as_str()
            .ok_or_else(|| SmoketestError::entry_not_string(test_name, &self.path))?;

        serde_json::from_str(document)
            .map_err(|e| SmoketestError::test_json(test_name, &self.path, e))
    }
}

/// A single test document. Fields other than `tasks` are not needed here and
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestConfig {
    pub tasks: Vec<TaskSpec>,
}

impl TestConfig {
    /// Number of workers the test needs: one per task copy
    #[must_use]
    pub fn worker_count(&self) -> u64 {
        self.tasks.iter().map(TaskSpec::copies).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct TaskSpec {
    #[serde(default)]
    pub duplicates: Option<NonZeroU32>,
}

impl TaskSpec {
    /// How many copies of this task run; `duplicates` defaults to 1
    #[must_use]
    pub fn copies(&self) -> u64 {
        self.duplicates.map_or(1, |n| u64::from(n.get()))
    }
}

/// Read the ConfigMap at `path` and count the workers `test_name` needs
///
/// # Errors
///
/// Returns any error from [`ConfigMap::load`] or [`ConfigMap::test_config`]
pub fn count_workers_needed(path: &Path, test_name: &str) -> Result<u64, SmoketestError> {
    let config = ConfigMap::load(path)?.test_config(test_name)?;
    let workers = config.worker_count();
    debug!(test = test_name, tasks = config.tasks.len(), workers, "counted workers");
    Ok(workers)
}
