//! Error type shared by the launcher components

use crate::docker::DockerError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a cdflow invocation
#[derive(Debug, Error)]
pub enum CdflowError {
    /// A storage locator was not of the form `s3://bucket/key`
    #[error("Invalid storage locator '{locator}': {reason}")]
    InvalidLocator {
        locator: String,
        reason: &'static str,
    },

    /// The component name could not be derived from the git remote
    #[error("Could not read the 'origin' git remote to determine the component name: {0}")]
    NoGitRemote(String),

    /// A required command-line parameter was absent
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// An object-storage read or its payload failed
    #[error("Failed to fetch s3://{bucket}/{key}: {message}")]
    MetadataFetch {
        bucket: String,
        key: String,
        message: String,
    },

    /// Fetched data or the manifest lacks a required field
    #[error("Field '{field}' not found in {location}")]
    MissingField {
        field: &'static str,
        location: String,
    },

    /// The project manifest could not be read or parsed
    #[error("Failed to read manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error(transparent)]
    Docker(#[from] DockerError),

    /// Writing the container output failed
    #[error("Failed to write container output: {0}")]
    Output(#[from] std::io::Error),

    /// Ctrl-C while the container was running
    #[error("Interrupted")]
    Interrupted,
}
