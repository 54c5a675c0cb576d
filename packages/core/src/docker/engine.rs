//! Container engine capability
//!
//! The orchestrator and the release flow only see this trait, so they can
//! be driven by a fake engine in tests. [`DockerClient`] is the real one.

use super::container::{self, ContainerSpec};
use super::image;
use super::progress::ProgressReporter;
use super::{DockerClient, DockerError};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

/// Operations the launcher needs from a container runtime
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Create and start a detached container, returning its ID
    async fn run_detached(&self, spec: &ContainerSpec) -> Result<String, DockerError>;

    /// Combined stdout/stderr of a container, followed until it exits
    fn logs<'a>(&'a self, id: &'a str) -> BoxStream<'a, Result<Bytes, DockerError>>;

    /// Exit code from the container's final state
    async fn exit_code(&self, id: &str) -> Result<i64, DockerError>;

    /// Stop a container; a request timeout surfaces as [`DockerError::Timeout`]
    async fn stop(&self, id: &str) -> Result<(), DockerError>;

    /// Remove a stopped container
    async fn remove(&self, id: &str) -> Result<(), DockerError>;

    /// Content digest of an image, pulling it first if it is not local
    async fn image_digest(&self, image: &str) -> Result<String, DockerError>;
}

#[async_trait]
impl ContainerEngine for DockerClient {
    async fn run_detached(&self, spec: &ContainerSpec) -> Result<String, DockerError> {
        container::run_detached(self, spec).await
    }

    fn logs<'a>(&'a self, id: &'a str) -> BoxStream<'a, Result<Bytes, DockerError>> {
        container::follow_logs(self, id).boxed()
    }

    async fn exit_code(&self, id: &str) -> Result<i64, DockerError> {
        container::container_exit_code(self, id).await
    }

    async fn stop(&self, id: &str) -> Result<(), DockerError> {
        container::stop_container(self, id, None).await
    }

    async fn remove(&self, id: &str) -> Result<(), DockerError> {
        container::remove_container(self, id, false).await
    }

    async fn image_digest(&self, image: &str) -> Result<String, DockerError> {
        let mut progress = ProgressReporter::new();
        image::image_digest(self, image, &mut progress).await
    }
}
