//! Launcher configuration
//!
//! Everything the launcher reads from its surroundings is gathered here
//! once, at the process boundary, and passed explicitly to the resolver and
//! the orchestrator.

use crate::docker::DOCKER_SOCKET_PATH;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the commands image
pub const IMAGE_OVERRIDE_VAR: &str = "CDFLOW_IMAGE_ID";

/// Environment variable carrying the commands image digest into the container
pub const IMAGE_DIGEST_VAR: &str = "CDFLOW_IMAGE_DIGEST";

/// Project manifest file name, relative to the project root
pub const MANIFEST_FILE: &str = "cdflow.yml";

/// Credential and context variables passed through to the container
pub const PASSTHROUGH_VARS: [&str; 6] = [
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "FASTLY_API_KEY",
    "ROLE_SESSION_NAME",
    "JOB_NAME",
];

/// Variables handed to the container
///
/// Each pass-through variable is carried even when unset, so the container
/// sees it as explicitly unset rather than inherited from the image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeEnvironment {
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_session_token: Option<String>,
    pub fastly_api_key: Option<String>,
    pub role_session_name: Option<String>,
    pub job_name: Option<String>,
    /// Only set by the release flow
    pub image_digest: Option<String>,
}

impl RuntimeEnvironment {
    /// Read the pass-through variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let [
            aws_access_key_id,
            aws_secret_access_key,
            aws_session_token,
            fastly_api_key,
            role_session_name,
            job_name,
        ] = PASSTHROUGH_VARS.map(lookup);

        Self {
            aws_access_key_id,
            aws_secret_access_key,
            aws_session_token,
            fastly_api_key,
            role_session_name,
            job_name,
            image_digest: None,
        }
    }

    /// Copy with the image digest recorded
    pub fn with_image_digest(self, digest: impl Into<String>) -> Self {
        Self {
            image_digest: Some(digest.into()),
            ..self
        }
    }

    /// Render as the engine's env list: `KEY=value`, or bare `KEY` when unset
    pub fn to_env_list(&self) -> Vec<String> {
        let values = [
            &self.aws_access_key_id,
            &self.aws_secret_access_key,
            &self.aws_session_token,
            &self.fastly_api_key,
            &self.role_session_name,
            &self.job_name,
        ];

        let mut env: Vec<String> = PASSTHROUGH_VARS
            .iter()
            .zip(values)
            .map(|(key, value)| match value {
                Some(value) => format!("{key}={value}"),
                None => key.to_string(),
            })
            .collect();

        if let Some(digest) = &self.image_digest {
            env.push(format!("{IMAGE_DIGEST_VAR}={digest}"));
        }
        env
    }
}

/// Configuration for one launcher invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    /// Image to run instead of the default or resolved one
    pub image_override: Option<String>,
    /// Directory the launcher was started in
    pub project_root: PathBuf,
    /// Project manifest holding the account scheme locator
    pub manifest_path: PathBuf,
    /// Docker control socket shared with the container
    pub docker_socket: PathBuf,
    pub environment: RuntimeEnvironment,
}

impl LauncherConfig {
    /// Build from a project root and a variable lookup
    pub fn from_lookup<F>(project_root: impl Into<PathBuf>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_root = project_root.into();
        Self {
            image_override: lookup(IMAGE_OVERRIDE_VAR),
            manifest_path: project_root.join(MANIFEST_FILE),
            docker_socket: PathBuf::from(DOCKER_SOCKET_PATH),
            environment: RuntimeEnvironment::from_lookup(lookup),
            project_root,
        }
    }

    /// Build from the current directory and the process environment
    pub fn from_env() -> std::io::Result<Self> {
        let project_root = std::env::current_dir()?;
        Ok(Self::from_lookup(project_root, |key| std::env::var(key).ok()))
    }

    /// Resolve a path given on the command line against the project root
    pub fn absolute_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}
