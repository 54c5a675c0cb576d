//! Docker client wrapper
//!
//! Thin wrapper over [`bollard::Docker`] that maps connection failures to
//! [`DockerError`] and exposes the raw client for the operation modules.

use super::DockerError;
use bollard::Docker;

/// Connected Docker client
#[derive(Clone)]
pub struct DockerClient {
    inner: Docker,
}

impl DockerClient {
    /// Connect to the local Docker daemon using the platform defaults
    /// (`DOCKER_HOST`, or the default unix socket).
    pub fn new() -> Result<Self, DockerError> {
        let inner = Docker::connect_with_local_defaults().map_err(DockerError::from)?;
        Ok(Self { inner })
    }

    /// Access the underlying bollard client
    pub fn inner(&self) -> &Docker {
        &self.inner
    }
}
