//! Commands image resolution
//!
//! Order of precedence:
//! 1. `CDFLOW_IMAGE_ID` override, verbatim
//! 2. for `deploy`, the digest recorded when the component version was released
//! 3. the default commands image

use super::locator::parse_locator;
use super::metadata::{
    IMAGE_DIGEST_FIELD, fetch_account_scheme, fetch_release_metadata, release_bucket,
};
use super::store::ObjectStore;
use crate::config::{LauncherConfig, Manifest};
use crate::docker::ContainerEngine;
use crate::error::CdflowError;
use crate::invocation::Invocation;
use std::path::Path;
use tracing::{debug, info};

/// Image run when nothing more specific applies
pub const DEFAULT_IMAGE: &str = "mergermarket/cdflow-commands:latest";

/// Decide which image this invocation runs
///
/// `store` is only used for deploys without an override.
pub async fn resolve_image<S: ObjectStore + ?Sized>(
    config: &LauncherConfig,
    invocation: &Invocation,
    store: &S,
) -> Result<String, CdflowError> {
    if let Some(image) = &config.image_override {
        debug!("Using image override {}", image);
        return Ok(image.clone());
    }

    if invocation.is_deploy() {
        let component = invocation
            .component
            .as_deref()
            .ok_or_else(|| CdflowError::MissingParameter("component name".to_string()))?;
        let version = invocation.version.as_deref().ok_or_else(|| {
            CdflowError::MissingParameter("version to deploy".to_string())
        })?;
        return find_image_from_release(store, &config.manifest_path, component, version).await;
    }

    Ok(DEFAULT_IMAGE.to_string())
}

/// Image digest recorded in the release metadata of `component` at `version`
///
/// manifest → account scheme locator → account scheme → release bucket →
/// release metadata → `cdflow_image_digest`. Any missing link is an error.
pub async fn find_image_from_release<S: ObjectStore + ?Sized>(
    store: &S,
    manifest_path: &Path,
    component: &str,
    version: &str,
) -> Result<String, CdflowError> {
    let manifest = Manifest::load(manifest_path)?;
    let locator = parse_locator(manifest.account_scheme(manifest_path)?)?;

    let scheme = fetch_account_scheme(store, &locator.bucket, &locator.key).await?;
    let bucket = release_bucket(&scheme, &locator.to_string())?;

    let mut metadata = fetch_release_metadata(store, bucket, component, version).await?;
    let digest = metadata
        .remove(IMAGE_DIGEST_FIELD)
        .ok_or_else(|| CdflowError::MissingField {
            field: IMAGE_DIGEST_FIELD,
            location: format!("release metadata of {component} version {version}"),
        })?;

    info!("Deploying {} {} with image {}", component, version, digest);
    Ok(digest)
}

/// Digest of the image a release will run, pulled if not present
///
/// Handed to the container so the release can record which commands image
/// built it.
pub async fn release_image_digest<E: ContainerEngine + ?Sized>(
    engine: &E,
    image: &str,
) -> Result<String, CdflowError> {
    let digest = engine.image_digest(image).await?;
    debug!("Release image {} has digest {}", image, digest);
    Ok(digest)
}
