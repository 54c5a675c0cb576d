//! Output utilities for the launcher
//!
//! Error formatting with troubleshooting hints, and the final status line.

pub mod errors;

pub use errors::{format_docker_error, format_launch_error, launch_error_anyhow};

use cdflow_core::RunResult;

/// Print the final message: stdout on success, stderr otherwise
pub fn report_result(result: &RunResult) {
    if result.is_success() {
        println!("{}", result.message);
    } else {
        eprintln!("{}", result.message);
    }
}
