//! Smoketest CLI
//!
//! Deploys or destroys a Pravega smoketest helm release. Assumes helm and
//! kubectl are installed and kubectl points at the target cluster.

use clap::{Arg, ArgAction, ArgMatches, Command};
use smoketest_config::{DEFAULT_CONFIG_PATH, DEFAULT_TEST_NAME};
use smoketest_deployer::{
    CommandRunner, DEFAULT_CHART_PATH, DEFAULT_HELM_BINARY, DEFAULT_NAMESPACE, DeployOptions,
    Deployer, DeployerSettings, DryRunRunner, ProcessRunner,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let matches = cli().get_matches();

    match run(&matches) {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Logs go to stderr; stdout belongs to helm
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn cli() -> Command {
    Command::new("smoketest")
        .version("0.1.0")
        .about("Deploy a pravega smoketest test")
        .arg(
            Arg::new("task")
                .value_name("TASK")
                .help("Name of task to run")
                .value_parser(["deploy", "destroy"])
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("test")
                .long("test")
                .value_name("NAME")
                .help("Test configuration to start. Name should be in kebab case")
                .default_value(DEFAULT_TEST_NAME),
        )
        .arg(
            Arg::new("image-repository")
                .long("image-repository")
                .value_name("REPO")
                .help("Image repository of pravega smoketest to use"),
        )
        .arg(
            Arg::new("image-tag")
                .long("image-tag")
                .value_name("TAG")
                .help("Image tag of pravega smoketest to use"),
        )
        .arg(
            Arg::new("controller-uri")
                .long("controller-uri")
                .value_name("URI")
                .help("Full URI of the Pravega controller"),
        )
        .arg(
            Arg::new("helm")
                .long("helm")
                .value_name("PATH")
                .help("helm binary to invoke")
                .env("SMOKETEST_HELM")
                .default_value(DEFAULT_HELM_BINARY),
        )
        .arg(
            Arg::new("chart")
                .long("chart")
                .value_name("PATH")
                .help("Chart to install")
                .default_value(DEFAULT_CHART_PATH),
        )
        .arg(
            Arg::new("namespace")
                .long("namespace")
                .value_name("NAMESPACE")
                .help("Namespace to install the release into")
                .default_value(DEFAULT_NAMESPACE),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Tests ConfigMap used to count workers")
                .env("SMOKETEST_CONFIG")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the helm command instead of running it")
                .action(ArgAction::SetTrue),
        )
}

fn settings(matches: &ArgMatches) -> DeployerSettings {
    let defaults = DeployerSettings::default();
    DeployerSettings {
        helm_binary: matches
            .get_one::<String>("helm")
            .cloned()
            .unwrap_or(defaults.helm_binary),
        chart_path: matches
            .get_one::<String>("chart")
            .cloned()
            .unwrap_or(defaults.chart_path),
        namespace: matches
            .get_one::<String>("namespace")
            .cloned()
            .unwrap_or(defaults.namespace),
        config_path: matches
            .get_one::<PathBuf>("config")
            .cloned()
            .unwrap_or(defaults.config_path),
    }
}

fn deploy_options(matches: &ArgMatches) -> DeployOptions {
    let test_name = matches
        .get_one::<String>("test")
        .map_or(DEFAULT_TEST_NAME, String::as_str);

    DeployOptions {
        test_name: test_name.to_string(),
        image_repository: matches.get_one::<String>("image-repository").cloned(),
        image_tag: matches.get_one::<String>("image-tag").cloned(),
        controller_uri: matches.get_one::<String>("controller-uri").cloned(),
    }
}

/// Run the selected task and return helm's exit code
fn run(matches: &ArgMatches) -> Result<i32, anyhow::Error> {
    let runner: Box<dyn CommandRunner> = if matches.get_flag("dry-run") {
        Box::new(DryRunRunner::new())
    } else {
        Box::new(ProcessRunner::new())
    };
    let mut deployer = Deployer::new(settings(matches), runner);
    let options = deploy_options(matches);

    let task = matches.get_one::<String>("task").map(String::as_str);
    let status = match task {
        Some("deploy") => deployer.deploy(&options)?,
        Some("destroy") => deployer.destroy(&options.test_name)?,
        other => anyhow::bail!("unknown task {other:?}"),
    };

    Ok(status.code)
}
