//! Docker image lookup and pull operations
//!
//! Resolves an image reference to its content digest, pulling the image
//! with progress feedback when it is not present locally.

use super::progress::ProgressReporter;
use super::{DockerClient, DockerError};
use bollard::query_parameters::CreateImageOptions;
use futures_util::StreamExt;
use tracing::{debug, warn};

/// Split an image reference into the repository and tag the pull API expects
///
/// Digest references are passed through whole with no tag. References
/// without a tag default to `latest`.
pub fn split_image_reference(image: &str) -> (&str, Option<&str>) {
    if image.contains('@') {
        return (image, None);
    }
    let name_start = image.rfind('/').map(|idx| idx + 1).unwrap_or(0);
    match image[name_start..].rfind(':') {
        Some(idx) => {
            let split = name_start + idx;
            (&image[..split], Some(&image[split + 1..]))
        }
        None => (image, Some("latest")),
    }
}

/// Resolve an image to its repository digest, pulling it if absent
///
/// Returns the first `RepoDigests` entry, or the reference itself when the
/// image carries no repository digest (e.g. a locally built image).
pub async fn image_digest(
    client: &DockerClient,
    image: &str,
    progress: &mut ProgressReporter,
) -> Result<String, DockerError> {
    debug!("Resolving digest for image {}", image);

    let info = match client.inner().inspect_image(image).await {
        Ok(info) => info,
        Err(bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        }) => {
            warn!("Image {} not found locally, pulling", image);
            pull_image(client, image, progress).await?;
            client
                .inner()
                .inspect_image(image)
                .await
                .map_err(|e| DockerError::Image(format!("Failed to inspect {image}: {e}")))?
        }
        Err(e) => return Err(DockerError::Image(format!("Failed to inspect {image}: {e}"))),
    };

    let digest = info
        .repo_digests
        .and_then(|digests| digests.into_iter().next())
        .unwrap_or_else(|| image.to_string());
    debug!("Image {} resolved to {}", image, digest);
    Ok(digest)
}

/// Pull an image from its registry, reporting per-layer progress
pub async fn pull_image(
    client: &DockerClient,
    image: &str,
    progress: &mut ProgressReporter,
) -> Result<(), DockerError> {
    let (repo, tag) = split_image_reference(image);
    debug!("Pulling image {} (repo {}, tag {:?})", image, repo, tag);

    let options = CreateImageOptions {
        from_image: Some(repo.to_string()),
        tag: tag.map(str::to_string),
        platform: String::new(),
        ..Default::default()
    };

    let mut stream = client.inner().create_image(Some(options), None, None);

    progress.add_spinner("pull", &format!("Pulling {image}..."));

    while let Some(result) = stream.next().await {
        match result {
            Ok(info) => {
                if let Some(error_detail) = &info.error_detail
                    && let Some(error_msg) = &error_detail.message
                {
                    progress.abandon_all(error_msg);
                    return Err(DockerError::Pull(error_msg.to_string()));
                }

                if let Some(layer_id) = &info.id {
                    let status = info.status.as_deref().unwrap_or("");

                    match status {
                        "Already exists" | "Pull complete" => {
                            progress.finish(layer_id, status);
                        }
                        "Downloading" | "Extracting" => {
                            if let Some(progress_detail) = &info.progress_detail {
                                let current = progress_detail.current.unwrap_or(0) as u64;
                                let total = progress_detail.total.unwrap_or(0) as u64;

                                if total > 0 {
                                    progress.update_layer(layer_id, current, total, status);
                                }
                            }
                        }
                        _ => {
                            progress.update_spinner(layer_id, status);
                        }
                    }
                } else if let Some(status) = &info.status {
                    progress.update_spinner("pull", status);
                }
            }
            Err(e) => {
                progress.abandon_all("Pull failed");
                return Err(DockerError::Pull(format!("Pull failed for {image}: {e}")));
            }
        }
    }

    progress.finish("pull", &format!("Pull complete: {image}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_tagged_reference() {
        assert_eq!(
            split_image_reference("mergermarket/cdflow-commands:latest"),
            ("mergermarket/cdflow-commands", Some("latest"))
        );
    }

    #[test]
    fn split_untagged_reference_defaults_to_latest() {
        assert_eq!(
            split_image_reference("mergermarket/cdflow-commands"),
            ("mergermarket/cdflow-commands", Some("latest"))
        );
    }

    #[test]
    fn split_keeps_registry_port() {
        assert_eq!(
            split_image_reference("registry.local:5000/team/app"),
            ("registry.local:5000/team/app", Some("latest"))
        );
        assert_eq!(
            split_image_reference("registry.local:5000/team/app:1.4"),
            ("registry.local:5000/team/app", Some("1.4"))
        );
    }

    #[test]
    fn split_digest_reference_is_whole() {
        let image = "mergermarket/cdflow-commands@sha256:0123abcd";
        assert_eq!(split_image_reference(image), (image, None));
    }
}
