//! Docker container lifecycle operations
//!
//! Functions to create, start, follow, inspect, stop, and remove the single
//! container a cdflow invocation runs.

use super::image::pull_image;
use super::progress::ProgressReporter;
use super::{DockerClient, DockerError};
use bollard::container::LogOutput;
use bollard::models::ContainerCreateBody;
use bollard::query_parameters::{
    CreateContainerOptions, LogsOptions, RemoveContainerOptions, StartContainerOptions,
    StopContainerOptions,
};
use bollard::service::{HostConfig, Mount, MountTypeEnum};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Host path of the Docker control socket shared with the container
pub const DOCKER_SOCKET_PATH: &str = "/var/run/docker.sock";

/// Seconds the daemon waits for a graceful stop before killing
pub const DEFAULT_STOP_TIMEOUT_SECS: i32 = 10;

/// A host path bound into the container at the identical path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    pub path: PathBuf,
    pub read_only: bool,
}

impl BindMount {
    pub fn read_write(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_only: false,
        }
    }

    pub fn read_only(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_only: true,
        }
    }

    /// Convert to a bollard mount
    pub fn to_bollard_mount(&self) -> Mount {
        let path = self.path.to_string_lossy().into_owned();
        Mount {
            target: Some(path.clone()),
            source: Some(path),
            typ: Some(MountTypeEnum::BIND),
            read_only: Some(self.read_only),
            ..Default::default()
        }
    }
}

/// Everything the engine needs to start the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: String,
    pub command: Vec<String>,
    pub env: Vec<String>,
    pub working_dir: PathBuf,
    pub mounts: Vec<BindMount>,
}

/// Bind set for a run: the project root read-write, the Docker socket
/// read-only, and the platform config read-only when one is given.
pub fn build_bind_mounts(
    project_root: &Path,
    docker_socket: &Path,
    platform_config: Option<&Path>,
) -> Vec<BindMount> {
    let mut mounts = vec![
        BindMount::read_write(project_root),
        BindMount::read_only(docker_socket),
    ];
    if let Some(path) = platform_config {
        mounts.push(BindMount::read_only(path));
    }
    mounts
}

/// Create and start a detached container from `spec`
///
/// Pulls the image first when the daemon does not have it, the way
/// `docker run` does. A container that was created but failed to start is
/// removed before the error is returned. Returns the container ID.
pub async fn run_detached(client: &DockerClient, spec: &ContainerSpec) -> Result<String, DockerError> {
    let id = match create_container(client, spec).await {
        Err(CreateFailure::ImageMissing(msg)) => {
            debug!("Image {} not present locally ({}), pulling", spec.image, msg);
            let mut progress = ProgressReporter::new();
            pull_image(client, &spec.image, &mut progress).await?;
            create_container(client, spec)
                .await
                .map_err(CreateFailure::into_docker_error)?
        }
        other => other.map_err(CreateFailure::into_docker_error)?,
    };

    if let Err(start_err) = start_container(client, &id).await {
        if let Err(remove_err) = remove_container(client, &id, true).await {
            debug!("Could not remove unstarted container {}: {}", id, remove_err);
        }
        return Err(start_err);
    }

    Ok(id)
}

enum CreateFailure {
    ImageMissing(String),
    Other(DockerError),
}

impl CreateFailure {
    fn into_docker_error(self) -> DockerError {
        match self {
            CreateFailure::ImageMissing(msg) => {
                DockerError::Container(format!("Failed to create container: {msg}"))
            }
            CreateFailure::Other(err) => err,
        }
    }
}

async fn create_container(client: &DockerClient, spec: &ContainerSpec) -> Result<String, CreateFailure> {
    let working_dir = spec.working_dir.to_string_lossy().into_owned();
    debug!(
        "Creating container from image {} in {} with {} mounts",
        spec.image,
        working_dir,
        spec.mounts.len()
    );

    let host_config = HostConfig {
        mounts: Some(spec.mounts.iter().map(BindMount::to_bollard_mount).collect()),
        auto_remove: Some(false),
        ..Default::default()
    };

    let config = ContainerCreateBody {
        image: Some(spec.image.clone()),
        cmd: Some(spec.command.clone()),
        env: if spec.env.is_empty() {
            None
        } else {
            Some(spec.env.clone())
        },
        working_dir: Some(working_dir),
        host_config: Some(host_config),
        ..Default::default()
    };

    let options = CreateContainerOptions {
        name: None,
        platform: String::new(),
    };

    match client.inner().create_container(Some(options), config).await {
        Ok(response) => {
            debug!("Container created with ID: {}", response.id);
            Ok(response.id)
        }
        Err(bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message,
        }) => Err(CreateFailure::ImageMissing(message)),
        Err(e) => Err(CreateFailure::Other(DockerError::Container(format!(
            "Failed to create container: {e}"
        )))),
    }
}

/// Start an existing container
pub async fn start_container(client: &DockerClient, id: &str) -> Result<(), DockerError> {
    debug!("Starting container: {}", id);

    client
        .inner()
        .start_container(id, None::<StartContainerOptions>)
        .await
        .map_err(|e| DockerError::Container(format!("Failed to start container {id}: {e}")))?;

    debug!("Container {} started", id);
    Ok(())
}

/// Follow the combined stdout/stderr stream of a container
///
/// Each item is one raw chunk as the daemon delivered it.
pub fn follow_logs<'a>(
    client: &'a DockerClient,
    id: &'a str,
) -> impl Stream<Item = Result<Bytes, DockerError>> + Send + 'a {
    let options = LogsOptions {
        stdout: true,
        stderr: true,
        follow: true,
        tail: "all".to_string(),
        ..Default::default()
    };

    client
        .inner()
        .logs(id, Some(options))
        .map(|result| result.map(LogOutput::into_bytes).map_err(DockerError::from))
}

/// Read the exit code from the container's final state
pub async fn container_exit_code(client: &DockerClient, id: &str) -> Result<i64, DockerError> {
    debug!("Inspecting exit code of container {}", id);

    let info = client
        .inner()
        .inspect_container(id, None)
        .await
        .map_err(|e| DockerError::Container(format!("Failed to inspect container {id}: {e}")))?;

    info.state
        .and_then(|state| state.exit_code)
        .ok_or_else(|| DockerError::Container(format!("Container {id} reported no exit code")))
}

/// Stop a container
///
/// A container that already exited counts as stopped. A request timeout is
/// reported as [`DockerError::Timeout`] so callers can tell it apart.
pub async fn stop_container(
    client: &DockerClient,
    id: &str,
    timeout_secs: Option<i32>,
) -> Result<(), DockerError> {
    let timeout = timeout_secs.unwrap_or(DEFAULT_STOP_TIMEOUT_SECS);
    debug!("Stopping container {} with {}s timeout", id, timeout);

    let options = StopContainerOptions {
        signal: None,
        t: Some(timeout),
    };

    match client.inner().stop_container(id, Some(options)).await {
        Ok(()) => {}
        Err(bollard::errors::Error::DockerResponseServerError {
            status_code: 304, ..
        }) => {
            debug!("Container {} was already stopped", id);
        }
        Err(e @ bollard::errors::Error::RequestTimeoutError) => {
            return Err(DockerError::Timeout(format!("Stopping container {id}: {e}")));
        }
        Err(e) => {
            return Err(DockerError::Container(format!(
                "Failed to stop container {id}: {e}"
            )));
        }
    }

    debug!("Container {} stopped", id);
    Ok(())
}

/// Remove a container
///
/// # Arguments
/// * `client` - Docker client
/// * `id` - Container ID
/// * `force` - Remove even if running
pub async fn remove_container(client: &DockerClient, id: &str, force: bool) -> Result<(), DockerError> {
    debug!("Removing container {} (force={})", id, force);

    let options = RemoveContainerOptions {
        force,
        v: false,
        link: false,
    };

    client
        .inner()
        .remove_container(id, Some(options))
        .await
        .map_err(|e| DockerError::Container(format!("Failed to remove container {id}: {e}")))?;

    debug!("Container {} removed", id);
    Ok(())
}
