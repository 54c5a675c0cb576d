//! Centralized error formatting
//!
//! Turns launcher failures into actionable messages for the terminal.

use anyhow::anyhow;
use cdflow_core::config::{IMAGE_OVERRIDE_VAR, MANIFEST_FILE};
use cdflow_core::{CdflowError, DockerError};
use console::style;

/// Format Docker errors with actionable guidance
///
/// Returns a styled, multi-line error message with troubleshooting steps.
pub fn format_docker_error(e: &DockerError) -> String {
    match e {
        DockerError::NotRunning => {
            format!(
                "{}\n\n  {}\n  {}\n  {}",
                style("Docker is not responding").red().bold(),
                "Start or restart the Docker daemon:",
                style("  Linux:  sudo systemctl start docker").cyan(),
                style("  Linux:  sudo systemctl restart docker").cyan(),
            )
        }
        DockerError::SocketNotFound => {
            format!(
                "{}\n\n  {}\n  {}\n  {}",
                style("Docker socket not found").red().bold(),
                "Docker may not be installed or the service isn't running:",
                style("  Linux:  sudo systemctl enable --now docker").cyan(),
                "Then verify the socket exists at /var/run/docker.sock.",
            )
        }
        DockerError::PermissionDenied => {
            format!(
                "{}\n\n  {}\n  {}\n  {}\n  {}",
                style("Permission denied accessing Docker").red().bold(),
                "Your user likely lacks access to the Docker socket.",
                style("  Check: ls -l /var/run/docker.sock").cyan(),
                style("  Fix:   sudo usermod -aG docker $USER").cyan(),
                "Then log out and back in (or run: newgrp docker).",
            )
        }
        DockerError::Connection(msg) => {
            format!(
                "{}\n\n  {}",
                style("Cannot connect to Docker").red().bold(),
                msg,
            )
        }
        DockerError::Pull(msg) | DockerError::Image(msg) => {
            format!(
                "{}\n\n  {}\n  {}",
                style("Could not obtain the cdflow commands image").red().bold(),
                msg,
                style(format!("  Check the image name, or unset {IMAGE_OVERRIDE_VAR}")).cyan(),
            )
        }
        _ => e.to_string(),
    }
}

/// Format any launcher failure, with a hint where one helps
pub fn format_launch_error(e: &CdflowError) -> String {
    let hint = match e {
        CdflowError::Docker(docker) => return format_docker_error(docker),
        CdflowError::NoGitRemote(_) => {
            Some("Pass the component name with --component <name>".to_string())
        }
        CdflowError::Manifest { .. } => Some(format!(
            "Run cdflow from the project root, next to {MANIFEST_FILE}"
        )),
        CdflowError::InvalidLocator { .. } => Some(format!(
            "account_scheme in {MANIFEST_FILE} must look like s3://bucket/key"
        )),
        CdflowError::MetadataFetch { .. } => {
            Some("Check your AWS credentials and that the version was released".to_string())
        }
        _ => None,
    };

    match hint {
        Some(hint) => format!("{e}\n\n  {}", style(format!("Tip: {hint}")).cyan()),
        None => e.to_string(),
    }
}

/// Format a launcher failure as anyhow::Error
pub fn launch_error_anyhow(e: &CdflowError) -> anyhow::Error {
    anyhow!("{}", format_launch_error(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_docker_error_not_running() {
        let msg = format_docker_error(&DockerError::NotRunning);
        assert!(msg.contains("Docker is not responding"));
        assert!(msg.contains("systemctl start docker"));
    }

    #[test]
    fn format_docker_error_socket_not_found() {
        let msg = format_docker_error(&DockerError::SocketNotFound);
        assert!(msg.contains("Docker socket not found"));
        assert!(msg.contains("/var/run/docker.sock"));
    }

    #[test]
    fn format_docker_error_permission_denied() {
        let msg = format_docker_error(&DockerError::PermissionDenied);
        assert!(msg.contains("Permission denied"));
        assert!(msg.contains("usermod"));
    }

    #[test]
    fn format_docker_error_pull_mentions_override() {
        let msg = format_docker_error(&DockerError::Pull("manifest unknown".to_string()));
        assert!(msg.contains("manifest unknown"));
        assert!(msg.contains("CDFLOW_IMAGE_ID"));
    }

    #[test]
    fn format_docker_error_timeout_is_plain() {
        let msg = format_docker_error(&DockerError::Timeout("stop".to_string()));
        assert_eq!(msg, "Docker request timed out: stop");
    }

    #[test]
    fn launch_error_delegates_docker_errors() {
        let msg = format_launch_error(&CdflowError::Docker(DockerError::NotRunning));
        assert!(msg.contains("Docker is not responding"));
    }

    #[test]
    fn launch_error_hints_component_flag() {
        let msg = format_launch_error(&CdflowError::NoGitRemote("no origin".to_string()));
        assert!(msg.contains("no origin"));
        assert!(msg.contains("--component"));
    }

    #[test]
    fn launch_error_hints_manifest_location() {
        let msg = format_launch_error(&CdflowError::Manifest {
            path: PathBuf::from("/work/app/cdflow.yml"),
            message: "No such file or directory".to_string(),
        });
        assert!(msg.contains("/work/app/cdflow.yml"));
        assert!(msg.contains("project root"));
    }

    #[test]
    fn launch_error_without_hint() {
        let msg = format_launch_error(&CdflowError::Interrupted);
        assert_eq!(msg, "Interrupted");
    }

    #[test]
    fn launch_error_anyhow_wraps_correctly() {
        let err = launch_error_anyhow(&CdflowError::MissingParameter("version".to_string()));
        assert!(err.to_string().contains("Missing parameter: version"));
    }
}
