//! Object storage access
//!
//! [`ObjectStore`] is the narrow capability the release lookup needs: read an
//! object's body, or read only the user metadata attached to it.
//! [`S3Store`] implements it with the AWS SDK, building its client on first
//! use so invocations that never touch storage never load AWS config.

use crate::error::CdflowError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::debug;

/// Read access to objects and their metadata sidecars
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download an object's body into memory
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, CdflowError>;

    /// Read the user metadata attached to an object, without its body
    async fn fetch_metadata(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<HashMap<String, String>, CdflowError>;
}

/// S3-backed object store using the default AWS credential chain
#[derive(Default)]
pub struct S3Store {
    client: OnceCell<Client>,
}

impl S3Store {
    pub fn new() -> Self {
        Self::default()
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                debug!("Loading AWS configuration");
                let conf = aws_config::load_defaults(BehaviorVersion::latest()).await;
                Client::new(&conf)
            })
            .await
    }
}

fn fetch_error<E: std::error::Error>(bucket: &str, key: &str, err: E) -> CdflowError {
    CdflowError::MetadataFetch {
        bucket: bucket.to_string(),
        key: key.to_string(),
        message: DisplayErrorContext(err).to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, CdflowError> {
        debug!("Downloading s3://{}/{}", bucket, key);

        let output = self
            .client()
            .await
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| fetch_error(bucket, key, e))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| fetch_error(bucket, key, e))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn fetch_metadata(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<HashMap<String, String>, CdflowError> {
        debug!("Reading metadata of s3://{}/{}", bucket, key);

        let output = self
            .client()
            .await
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| fetch_error(bucket, key, e))?;

        Ok(output.metadata().cloned().unwrap_or_default())
    }
}
