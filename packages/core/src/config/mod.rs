//! Configuration: launcher settings and the project manifest

pub mod manifest;
pub mod schema;

pub use manifest::Manifest;
pub use schema::{
    IMAGE_DIGEST_VAR, IMAGE_OVERRIDE_VAR, LauncherConfig, MANIFEST_FILE, PASSTHROUGH_VARS,
    RuntimeEnvironment,
};
