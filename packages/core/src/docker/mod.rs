//! Docker operations module
//!
//! This module provides everything the launcher needs from the Docker daemon:
//! - Docker client wrapper with connection handling
//! - Docker-specific error types
//! - Container lifecycle (create, start, follow logs, inspect, stop, remove)
//! - Image digest lookup with pull-if-absent and progress reporting
//! - The [`ContainerEngine`] capability trait
//! - Run orchestration with guaranteed cleanup

mod client;
pub mod container;
pub mod engine;
mod error;
pub mod image;
pub mod progress;
pub mod run;

// Core types
pub use client::DockerClient;
pub use error::DockerError;
pub use progress::ProgressReporter;

// Container lifecycle
pub use container::{BindMount, ContainerSpec, DOCKER_SOCKET_PATH, build_bind_mounts};
pub use engine::ContainerEngine;
pub use image::{image_digest, pull_image};

// Run orchestration
pub use run::{ContainerGuard, MESSAGE_DONE, MESSAGE_ERROR, RunRequest, RunResult, run_container};
