//! Container run orchestration
//!
//! Runs exactly one container per invocation:
//!
//! 1. build the container spec (binds, env, working dir)
//! 2. start it detached; an engine rejection here becomes a `(1, text)` result
//! 3. forward its combined output as it arrives
//! 4. read the exit code from its final state
//! 5. stop and remove it, on every path out of step 3 and 4

use super::container::{ContainerSpec, build_bind_mounts};
use super::engine::ContainerEngine;
use super::DockerError;
use crate::error::CdflowError;
use futures_util::StreamExt;
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, warn};

/// Message reported for a container that exited with status 0
pub const MESSAGE_DONE: &str = "Done";

/// Message reported for a container that exited with any other status
pub const MESSAGE_ERROR: &str = "Error";

/// What to run and how to wire it to the host
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub image: String,
    /// Full argument list handed to the image as its command
    pub command: Vec<String>,
    /// Bound read-write and used as the working directory
    pub project_root: PathBuf,
    /// Engine control socket, bound read-only
    pub docker_socket: PathBuf,
    /// `KEY=value` / bare `KEY` entries
    pub env: Vec<String>,
    /// Bound read-only when present
    pub platform_config: Option<PathBuf>,
}

impl RunRequest {
    pub fn to_spec(&self) -> ContainerSpec {
        ContainerSpec {
            image: self.image.clone(),
            command: self.command.clone(),
            env: self.env.clone(),
            working_dir: self.project_root.clone(),
            mounts: build_bind_mounts(
                &self.project_root,
                &self.docker_socket,
                self.platform_config.as_deref(),
            ),
        }
    }
}

/// Outcome of one container run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub exit_status: i64,
    pub message: String,
}

impl RunResult {
    /// Map a container exit code, keeping the original code
    pub fn from_exit_code(code: i64) -> Self {
        let message = if code == 0 { MESSAGE_DONE } else { MESSAGE_ERROR };
        Self {
            exit_status: code,
            message: message.to_string(),
        }
    }

    /// The engine refused to start the container
    pub fn engine_failure(err: &DockerError) -> Self {
        Self {
            exit_status: 1,
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_status == 0
    }
}

/// Owns a started container until it has been stopped and removed
pub struct ContainerGuard<'a, E: ContainerEngine + ?Sized> {
    engine: &'a E,
    id: String,
    released: bool,
}

impl<'a, E: ContainerEngine + ?Sized> ContainerGuard<'a, E> {
    pub fn new(engine: &'a E, id: String) -> Self {
        Self {
            engine,
            id,
            released: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Stop, then remove the container
    ///
    /// A stop that times out is tolerated; removal is still attempted. Any
    /// other failure is returned.
    pub async fn release(mut self) -> Result<(), DockerError> {
        self.released = true;

        match self.engine.stop(&self.id).await {
            Ok(()) => {}
            Err(DockerError::Timeout(msg)) => {
                warn!("Timed out stopping container {}: {}", self.id, msg);
            }
            Err(e) => return Err(e),
        }

        self.engine.remove(&self.id).await?;
        debug!("Container {} cleaned up", self.id);
        Ok(())
    }
}

impl<E: ContainerEngine + ?Sized> Drop for ContainerGuard<'_, E> {
    fn drop(&mut self) {
        if !self.released {
            warn!(
                "Container {} was not cleaned up; remove it with 'docker rm -f {}'",
                self.id, self.id
            );
        }
    }
}

/// Run a container to completion, forwarding its output to `out`
///
/// Returns the container's own exit status, or status 1 with the engine's
/// message when the container could not be started. Failures while following
/// the container are returned as errors once it has been cleaned up. A
/// cleanup failure after the container exited is logged and does not replace
/// its status.
///
/// Ctrl-C is handled from the moment the container starts: it ends the
/// follow with [`CdflowError::Interrupted`] and cleanup still runs. Further
/// Ctrl-C presses during cleanup are absorbed by the same handler.
pub async fn run_container<E, W>(
    engine: &E,
    request: &RunRequest,
    out: &mut W,
) -> Result<RunResult, CdflowError>
where
    E: ContainerEngine + ?Sized,
    W: AsyncWrite + Unpin + Send,
{
    let spec = request.to_spec();

    let id = match engine.run_detached(&spec).await {
        Ok(id) => id,
        Err(e) => {
            debug!("Engine rejected container for {}: {}", spec.image, e);
            return Ok(RunResult::engine_failure(&e));
        }
    };
    debug!("Container {} running {}", id, spec.image);

    let guard = ContainerGuard::new(engine, id);
    let outcome = until_interrupted(follow_to_exit(engine, guard.id(), out), guard.id()).await;
    let cleanup = guard.release().await;

    if let Err(cleanup_err) = cleanup {
        error!("Container cleanup failed: {}", cleanup_err);
    }
    outcome
}

async fn until_interrupted<F>(flow: F, id: &str) -> Result<RunResult, CdflowError>
where
    F: Future<Output = Result<RunResult, CdflowError>>,
{
    tokio::select! {
        outcome = flow => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted while running container {}", id);
            Err(CdflowError::Interrupted)
        }
    }
}

async fn follow_to_exit<E, W>(engine: &E, id: &str, out: &mut W) -> Result<RunResult, CdflowError>
where
    E: ContainerEngine + ?Sized,
    W: AsyncWrite + Unpin + Send,
{
    forward_logs(engine, id, out).await?;

    let code = engine.exit_code(id).await?;
    debug!("Container {} exited with {}", id, code);
    Ok(RunResult::from_exit_code(code))
}

async fn forward_logs<E, W>(engine: &E, id: &str, out: &mut W) -> Result<(), CdflowError>
where
    E: ContainerEngine + ?Sized,
    W: AsyncWrite + Unpin + Send,
{
    let mut stream = engine.logs(id);
    while let Some(chunk) = stream.next().await {
        out.write_all(&chunk?).await?;
        out.flush().await?;
    }
    Ok(())
}
