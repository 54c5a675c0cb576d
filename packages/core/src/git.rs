//! Component name lookup from the project's git remote

use crate::error::CdflowError;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Read `remote.origin.url` in `repo_dir` and derive the component name
pub fn component_name_from_git(repo_dir: &Path) -> Result<String, CdflowError> {
    let output = Command::new("git")
        .args(["config", "remote.origin.url"])
        .current_dir(repo_dir)
        .output()
        .map_err(|e| CdflowError::NoGitRemote(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CdflowError::NoGitRemote(format!(
            "git config remote.origin.url failed ({}): {}",
            output.status,
            stderr.trim()
        )));
    }

    let remote = String::from_utf8_lossy(&output.stdout);
    debug!("origin remote: {}", remote.trim());
    Ok(component_name_from_remote(&remote))
}

/// Last path segment of a remote URL, without a trailing `.git`
pub fn component_name_from_remote(remote: &str) -> String {
    let trimmed = remote.trim_matches(|c| matches!(c, '\t' | '\n' | ' ' | '/'));
    let name = trimmed.rsplit('/').next().unwrap_or(trimmed);
    name.strip_suffix(".git").unwrap_or(name).to_string()
}
