//! Smoketest deployer
//!
//! Installs and removes the `pravega-smoketest` helm release for a named test.

use smoketest_config::{DEFAULT_CONFIG_PATH, DEFAULT_TEST_NAME, SmoketestError, count_workers_needed};
use std::path::PathBuf;
use tracing::{info, warn};

pub mod runner;

pub use runner::{CommandRunner, DryRunRunner, ProcessRunner, RecordingRunner, RunStatus};

pub const RELEASE_PREFIX: &str = "pravega-smoketest-";
pub const DEFAULT_HELM_BINARY: &str = "helm";
pub const DEFAULT_CHART_PATH: &str = "charts/pravega-smoketest";
pub const DEFAULT_NAMESPACE: &str = "pravega-smoketest";

// Chart values set on install
pub const TEST_NAME_KEY: &str = "pravega_smoketest_test.test_name_kebab";
pub const NUM_WORKERS_KEY: &str = "pravega_smoketest_test.num_workers";
pub const IMAGE_REPOSITORY_KEY: &str = "image.repository";
pub const IMAGE_TAG_KEY: &str = "image.tag";
pub const CONTROLLER_URI_KEY: &str = "pravega_smoketest_test.controller_uri";

/// Where helm, the chart and the tests ConfigMap live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployerSettings {
    pub helm_binary: String,
    pub chart_path: String,
    pub namespace: String,
    pub config_path: PathBuf,
}

impl Default for DeployerSettings {
    fn default() -> Self {
        Self {
            helm_binary: DEFAULT_HELM_BINARY.to_string(),
            chart_path: DEFAULT_CHART_PATH.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

/// What to deploy. Unset image and controller fields keep the chart's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    pub test_name: String,
    pub image_repository: Option<String>,
    pub image_tag: Option<String>,
    pub controller_uri: Option<String>,
}

impl DeployOptions {
    #[must_use]
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            image_repository: None,
            image_tag: None,
            controller_uri: None,
        }
    }

    #[must_use]
    pub fn with_image_repository(mut self, repository: impl Into<String>) -> Self {
        self.image_repository = Some(repository.into());
        self
    }

    #[must_use]
    pub fn with_image_tag(mut self, tag: impl Into<String>) -> Self {
        self.image_tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_controller_uri(mut self, uri: impl Into<String>) -> Self {
        self.controller_uri = Some(uri.into());
        self
    }
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_NAME)
    }
}

/// Helm release name for a test
#[must_use]
pub fn release_name(test_name: &str) -> String {
    format!("{RELEASE_PREFIX}{test_name}")
}

/// Chart value overrides for a deploy, in the order helm receives them
#[must_use]
pub fn build_overrides(options: &DeployOptions, num_workers: u64) -> Vec<(&'static str, String)> {
    let mut overrides = vec![
        (TEST_NAME_KEY, options.test_name.clone()),
        (NUM_WORKERS_KEY, num_workers.to_string()),
    ];

    let optional = [
        (IMAGE_REPOSITORY_KEY, &options.image_repository),
        (IMAGE_TAG_KEY, &options.image_tag),
        (CONTROLLER_URI_KEY, &options.controller_uri),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            overrides.push((key, value.clone()));
        }
    }

    overrides
}

/// Join overrides into the `--set` argument format
#[must_use]
pub fn render_overrides(overrides: &[(&str, String)]) -> String {
    overrides
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

pub struct Deployer<R> {
    settings: DeployerSettings,
    runner: R,
}

impl<R: CommandRunner> Deployer<R> {
    #[must_use]
    pub const fn new(settings: DeployerSettings, runner: R) -> Self {
        Self { settings, runner }
    }

    #[must_use]
    pub const fn settings(&self) -> &DeployerSettings {
        &self.settings
    }

    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Install the release for `options.test_name`
    ///
    /// The worker count is read from the tests ConfigMap first, so a bad
    /// config fails before helm is called. A non-zero helm exit is logged and
    /// returned, not treated as an error.
    ///
    /// # Errors
    ///
    /// Returns `SmoketestError` if the config cannot be read or decoded, the
    /// test is missing, or helm cannot be started
    pub fn deploy(&mut self, options: &DeployOptions) -> Result<RunStatus, SmoketestError> {
        let num_workers = count_workers_needed(&self.settings.config_path, &options.test_name)?;
        let overrides = render_overrides(&build_overrides(options, num_workers));
        let release = release_name(&options.test_name);

        info!(
            test = %options.test_name,
            release = %release,
            namespace = %self.settings.namespace,
            num_workers,
            "deploying smoketest"
        );

        let argv = vec![
            self.settings.helm_binary.clone(),
            "install".to_string(),
            self.settings.chart_path.clone(),
            "--name".to_string(),
            release,
            "--namespace".to_string(),
            self.settings.namespace.clone(),
            "--set".to_string(),
            overrides,
        ];
        self.invoke(&argv)
    }

    /// Purge the release for `test_name`. Does not read the tests ConfigMap.
    ///
    /// # Errors
    ///
    /// Returns `SmoketestError::CommandNotFound` if helm cannot be started
    pub fn destroy(&mut self, test_name: &str) -> Result<RunStatus, SmoketestError> {
        let release = release_name(test_name);
        info!(test = test_name, release = %release, "destroying smoketest");

        let argv = vec![
            self.settings.helm_binary.clone(),
            "delete".to_string(),
            "--purge".to_string(),
            release,
        ];
        self.invoke(&argv)
    }

    fn invoke(&mut self, argv: &[String]) -> Result<RunStatus, SmoketestError> {
        let status = self.runner.run(argv)?;
        if !status.is_success() {
            warn!(command = %argv.join(" "), code = status.code, "helm exited with failure");
        }
        Ok(status)
    }
}
