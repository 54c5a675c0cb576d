//! In-memory fakes for the engine and object-store traits (tests only)

use crate::docker::{ContainerEngine, ContainerSpec, DockerError};
use crate::error::CdflowError;
use crate::release::ObjectStore;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use std::collections::HashMap;
use std::sync::Mutex;

pub const FAKE_CONTAINER_ID: &str = "container-1";

// ---------------------------------------------------------------------------
// FakeEngine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    RunDetached(ContainerSpec),
    Logs(String),
    ExitCode(String),
    Stop(String),
    Remove(String),
    ImageDigest(String),
}

/// Scripted container engine that records every call
#[derive(Debug, Default)]
pub struct FakeEngine {
    calls: Mutex<Vec<EngineCall>>,
    run_error: Mutex<Option<DockerError>>,
    logs: Vec<String>,
    log_error: Mutex<Option<DockerError>>,
    exit_code: i64,
    exit_code_error: Mutex<Option<DockerError>>,
    stop_error: Mutex<Option<DockerError>>,
    digests: HashMap<String, String>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_run_error(self, err: DockerError) -> Self {
        *self.run_error.lock().unwrap() = Some(err);
        self
    }

    pub fn with_logs<const N: usize>(mut self, chunks: [&str; N]) -> Self {
        self.logs = chunks.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_log_error(self, err: DockerError) -> Self {
        *self.log_error.lock().unwrap() = Some(err);
        self
    }

    pub fn with_exit_code(mut self, code: i64) -> Self {
        self.exit_code = code;
        self
    }

    pub fn with_exit_code_error(self, err: DockerError) -> Self {
        *self.exit_code_error.lock().unwrap() = Some(err);
        self
    }

    pub fn with_stop_error(self, err: DockerError) -> Self {
        *self.stop_error.lock().unwrap() = Some(err);
        self
    }

    pub fn with_digest(mut self, image: &str, digest: &str) -> Self {
        self.digests.insert(image.to_string(), digest.to_string());
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn run_detached(&self, spec: &ContainerSpec) -> Result<String, DockerError> {
        self.record(EngineCall::RunDetached(spec.clone()));
        match self.run_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(FAKE_CONTAINER_ID.to_string()),
        }
    }

    fn logs<'a>(&'a self, id: &'a str) -> BoxStream<'a, Result<Bytes, DockerError>> {
        self.record(EngineCall::Logs(id.to_string()));
        let mut items: Vec<Result<Bytes, DockerError>> = self
            .logs
            .iter()
            .map(|chunk| Ok(Bytes::from(chunk.clone())))
            .collect();
        if let Some(err) = self.log_error.lock().unwrap().take() {
            items.push(Err(err));
        }
        stream::iter(items).boxed()
    }

    async fn exit_code(&self, id: &str) -> Result<i64, DockerError> {
        self.record(EngineCall::ExitCode(id.to_string()));
        match self.exit_code_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(self.exit_code),
        }
    }

    async fn stop(&self, id: &str) -> Result<(), DockerError> {
        self.record(EngineCall::Stop(id.to_string()));
        match self.stop_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn remove(&self, id: &str) -> Result<(), DockerError> {
        self.record(EngineCall::Remove(id.to_string()));
        Ok(())
    }

    async fn image_digest(&self, image: &str) -> Result<String, DockerError> {
        self.record(EngineCall::ImageDigest(image.to_string()));
        Ok(self
            .digests
            .get(image)
            .cloned()
            .unwrap_or_else(|| image.to_string()))
    }
}

// ---------------------------------------------------------------------------
// FakeStore
// ---------------------------------------------------------------------------

/// In-memory object store keyed by (bucket, key)
#[derive(Debug, Default)]
pub struct FakeStore {
    objects: HashMap<(String, String), Vec<u8>>,
    metadata: HashMap<(String, String), HashMap<String, String>>,
    fetches: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, bucket: &str, key: &str, body: &str) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), body.as_bytes().to_vec());
        self
    }

    pub fn with_metadata<const N: usize>(
        mut self,
        bucket: &str,
        key: &str,
        entries: [(&str, &str); N],
    ) -> Self {
        let map = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.metadata
            .insert((bucket.to_string(), key.to_string()), map);
        self
    }

    /// Every `s3://bucket/key` fetched so far, in order
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    fn not_found(bucket: &str, key: &str) -> CdflowError {
        CdflowError::MetadataFetch {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: "NoSuchKey".to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, CdflowError> {
        self.fetches.lock().unwrap().push(format!("s3://{bucket}/{key}"));
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| Self::not_found(bucket, key))
    }

    async fn fetch_metadata(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<HashMap<String, String>, CdflowError> {
        self.fetches.lock().unwrap().push(format!("s3://{bucket}/{key}"));
        self.metadata
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| Self::not_found(bucket, key))
    }
}
