//! cdflow-core - Core library for the cdflow launcher
//!
//! This library provides the shared functionality behind the `cdflow`
//! binary: command-line interpretation, image resolution from release
//! metadata, and the lifecycle of the container that runs the cdflow
//! commands.

pub mod config;
pub mod docker;
pub mod error;
pub mod git;
pub mod invocation;
pub mod launcher;
pub mod release;

#[cfg(test)]
mod fakes;

// Re-export commonly used types
pub use config::{LauncherConfig, Manifest, RuntimeEnvironment};
pub use docker::{ContainerEngine, DockerClient, DockerError, RunRequest, RunResult};
pub use error::CdflowError;
pub use invocation::{Invocation, Subcommand};
pub use launcher::{launch, prepare_run};
pub use release::{DEFAULT_IMAGE, ObjectStore, S3Store, resolve_image};

// Re-export bollard to ensure all crates use the same version
pub use bollard;

/// Get the version of the cdflow-core library
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version() {
        assert!(!get_version().is_empty());
    }
}
