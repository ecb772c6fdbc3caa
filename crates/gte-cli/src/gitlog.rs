//! Git history retrieval.
//!
//! Thin collaborator around the git CLI: confirms the target is a
//! repository and reads `git log --format=%at %H %an` for the core
//! pipeline to parse.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use gte_core::{Commit, parse_log};

/// Resolve the repository root, failing if `dir` is not inside a git repo.
pub fn repo_root(dir: &Path) -> Result<PathBuf> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .context("failed to run git")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("not a git repository: {}", stderr.trim());
    }

    Ok(PathBuf::from(
        String::from_utf8_lossy(&output.stdout).trim(),
    ))
}

/// Read the commit log for the repository at `dir`.
///
/// A repository whose HEAD has no commits yet yields an empty list; any
/// other git failure is an error.
pub fn read_log(dir: &Path) -> Result<Vec<Commit>> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["log", "--format=%at %H %an"])
        .output()
        .context("failed to run git log")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("does not have any commits") {
            tracing::debug!("repository has no commits yet");
            return Ok(Vec::new());
        }
        bail!("git log failed: {}", stderr.trim());
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let commits = parse_log(&text);
    tracing::debug!(commits = commits.len(), "read commit log");
    Ok(commits)
}
