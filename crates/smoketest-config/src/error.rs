//! Error type shared by every smoketest crate.
//!
//! Each variant renders with a stable `ERR_*` code so scripts can match on it.

use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum SmoketestError {
    #[error("smoketest:{}: ERR_CONFIG_READ: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("smoketest:{}: ERR_CONFIG_YAML: {source}", .path.display())]
    ConfigYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("smoketest:{}: ERR_TEST_NOT_FOUND: no test named {test_name} under data", .path.display())]
    TestNotFound { test_name: String, path: PathBuf },

    #[error("smoketest:{}: ERR_TEST_ENTRY: data.{test_name} is not a string", .path.display())]
    EntryNotString { test_name: String, path: PathBuf },

    #[error("smoketest:{}: ERR_TEST_JSON: data.{test_name}: {source}", .path.display())]
    TestJson {
        test_name: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("smoketest: ERR_COMMAND_NOT_FOUND: {command} could not be started: {source}")]
    CommandNotFound {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl SmoketestError {
    #[must_use]
    pub fn config_read(path: &Path, source: std::io::Error) -> Self {
        Self::ConfigRead {
            path: path.to_path_buf(),
            source,
        }
    }

    #[must_use]
    pub fn config_yaml(path: &Path, source: serde_yaml::Error) -> Self {
        Self::ConfigYaml {
            path: path.to_path_buf(),
            source,
        }
    }

    #[must_use]
    pub fn test_not_found(test_name: &str, path: &Path) -> Self {
        Self::TestNotFound {
            test_name: test_name.to_string(),
            path: path.to_path_buf(),
        }
    }

    #[must_use]
    pub fn entry_not_string(test_name: &str, path: &Path) -> Self {
        Self::EntryNotString {
            test_name: test_name.to_string(),
            path: path.to_path_buf(),
        }
    }

    #[must_use]
    pub fn test_json(test_name: &str, path: &Path, source: serde_json::Error) -> Self {
        Self::TestJson {
            test_name: test_name.to_string(),
            path: path.to_path_buf(),
            source,
        }
    }

    #[must_use]
    pub fn command_not_found(command: &str, source: std::io::Error) -> Self {
        Self::CommandNotFound {
            command: command.to_string(),
            source,
        }
    }

    /// Stable code for the failure kind, as printed in the message
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ConfigRead { .. } => "ERR_CONFIG_READ",
            Self::ConfigYaml { .. } => "ERR_CONFIG_YAML",
            Self::TestNotFound { .. } => "ERR_TEST_NOT_FOUND",
            Self::EntryNotString { .. } => "ERR_TEST_ENTRY",
            Self::TestJson { .. } => "ERR_TEST_JSON",
            Self::CommandNotFound { .. } => "ERR_COMMAND_NOT_FOUND",
        }
    }
}
