//! cdflow - run cdflow commands inside the cdflow-commands container
//!
//! This module contains the CLI implementation used by the `cdflow` binary.

mod output;

use anyhow::{Context, Result};
use cdflow_core::{DockerClient, Invocation, LauncherConfig, S3Store, launch};
use std::ffi::OsString;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::output::{format_docker_error, launch_error_anyhow, report_result};

/// Log level used when RUST_LOG is not set
const DEFAULT_LOG_FILTER: &str = "warn";

/// Arguments to hand to the container: everything after the program name
///
/// Nothing is interpreted here, so `--`, `--help` and `--version` reach the
/// cdflow commands exactly as typed.
fn forwarded_args<I>(argv: I) -> Vec<String>
where
    I: IntoIterator<Item = OsString>,
{
    argv.into_iter()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

/// Diagnostics go to stderr; stdout carries the container output
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn launch_from_env(args: Vec<String>) -> Result<i64> {
    let config = LauncherConfig::from_env().context("Could not determine the project root")?;
    debug!("Project root {}", config.project_root.display());

    let invocation =
        Invocation::from_args(args, &config.project_root).map_err(|e| launch_error_anyhow(&e))?;

    let client = DockerClient::new().map_err(|e| anyhow::anyhow!(format_docker_error(&e)))?;
    let store = S3Store::new();
    let mut stdout = tokio::io::stdout();

    let result = launch(&config, &invocation, &client, &store, &mut stdout)
        .await
        .map_err(|e| launch_error_anyhow(&e))?;

    report_result(&result);
    Ok(result.exit_status)
}

/// Run the launcher and return the process exit status
pub fn run() -> Result<i32> {
    init_tracing();

    let args = forwarded_args(std::env::args_os());

    let rt = tokio::runtime::Runtime::new()?;
    let status = rt.block_on(launch_from_env(args))?;

    // Statuses outside i32 cannot come from a real container
    Ok(i32::try_from(status).unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> Vec<String> {
        let argv = std::iter::once("cdflow")
            .chain(list.iter().copied())
            .map(OsString::from);
        forwarded_args(argv)
    }

    #[test]
    fn forwards_arguments_unchanged() {
        assert_eq!(
            parse(&["deploy", "-c", "myapp", "live", "1.2.3", "--plan-only"]),
            vec!["deploy", "-c", "myapp", "live", "1.2.3", "--plan-only"]
        );
    }

    #[test]
    fn forwards_leading_options_and_help() {
        assert_eq!(parse(&["--help"]), vec!["--help"]);
        assert_eq!(parse(&["-v", "release"]), vec!["-v", "release"]);
        assert_eq!(parse(&["--version"]), vec!["--version"]);
    }

    #[test]
    fn forwards_double_dash_wherever_it_appears() {
        assert_eq!(parse(&["--", "deploy"]), vec!["--", "deploy"]);
        assert_eq!(parse(&["deploy", "--", "x"]), vec!["deploy", "--", "x"]);
        assert_eq!(parse(&["--"]), vec!["--"]);
    }

    #[test]
    fn accepts_no_arguments() {
        assert!(parse(&[]).is_empty());
    }
}
