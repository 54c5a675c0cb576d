//! One launcher invocation, end to end

use crate::config::LauncherConfig;
use crate::docker::{ContainerEngine, RunRequest, RunResult, run_container};
use crate::error::CdflowError;
use crate::invocation::Invocation;
use crate::release::{ObjectStore, release_image_digest, resolve_image};
use tokio::io::AsyncWrite;
use tracing::debug;

/// Container run described by `config` and `invocation`, before it starts
///
/// `release` additionally learns the image digest (pulling the image if
/// needed) and mounts the platform config.
pub async fn prepare_run<E, S>(
    config: &LauncherConfig,
    invocation: &Invocation,
    engine: &E,
    store: &S,
) -> Result<RunRequest, CdflowError>
where
    E: ContainerEngine + ?Sized,
    S: ObjectStore + ?Sized,
{
    let image = resolve_image(config, invocation, store).await?;
    debug!("Resolved image {}", image);

    let mut environment = config.environment.clone();
    let mut platform_config = None;
    if invocation.is_release() {
        environment = environment.with_image_digest(release_image_digest(engine, &image).await?);
        platform_config = invocation
            .platform_config
            .as_deref()
            .map(|path| config.absolute_path(path));
    }

    Ok(RunRequest {
        image,
        command: invocation.args.clone(),
        project_root: config.project_root.clone(),
        docker_socket: config.docker_socket.clone(),
        env: environment.to_env_list(),
        platform_config,
    })
}

/// Resolve the image, run it and report how it ended
pub async fn launch<E, S, W>(
    config: &LauncherConfig,
    invocation: &Invocation,
    engine: &E,
    store: &S,
    out: &mut W,
) -> Result<RunResult, CdflowError>
where
    E: ContainerEngine + ?Sized,
    S: ObjectStore + ?Sized,
    W: AsyncWrite + Unpin + Send,
{
    let request = prepare_run(config, invocation, engine, store).await?;
    run_container(engine, &request, out).await
}
