// src/http/fsops.rs

//! Filesystem and git helpers for the route layer: execute-bit handling,
//! repository discovery, branch lookup, and working-directory derivation.
//!
//! Everything here runs before a stream starts; failures are reported as
//! plain error responses, not stream events.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tokio::process::Command;
use tracing::debug;

/// Make sure `path` carries an execute bit, setting it if needed.
///
/// The runner assumes the bit is already set; this is the endpoint-side
/// preparation that makes that assumption hold for uploaded scripts.
#[cfg(unix)]
pub fn ensure_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)
        .with_context(|| format!("reading metadata for {}", path.display()))?;
    let mut permissions = metadata.permissions();

    if permissions.mode() & 0o111 != 0 {
        return Ok(());
    }

    permissions.set_mode(permissions.mode() | 0o755);
    fs::set_permissions(path, permissions)
        .with_context(|| format!("setting execute permission on {}", path.display()))?;

    debug!(path = %path.display(), "execute permission added");
    Ok(())
}

#[cfg(not(unix))]
pub fn ensure_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Derive the working directory for a deploy script.
///
/// The script's own directory is used, unless the path contains the
/// configured marker component, in which case the prefix before the marker
/// is the project root.
pub fn deploy_cwd(script: &Path, marker: Option<&str>) -> PathBuf {
    let dir = script
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let Some(marker) = marker else {
        return dir;
    };

    let mut prefix = PathBuf::new();
    for component in dir.components() {
        if let Component::Normal(name) = component {
            if name.to_str() == Some(marker) {
                if prefix.as_os_str().is_empty() {
                    break;
                }
                return prefix;
            }
        }
        prefix.push(component.as_os_str());
    }

    dir
}

/// True when `path` is a directory containing a `.git` entry.
pub fn is_git_repo(path: &Path) -> bool {
    path.is_dir() && path.join(".git").exists()
}

/// One discovered repository under the projects root.
#[derive(Debug, Clone, Serialize)]
pub struct RepoInfo {
    pub name: String,
    pub path: String,
    /// Currently checked-out branch, when resolvable.
    pub branch: Option<String>,
}

/// Scan one level under `root` for git checkouts, sorted by name.
pub async fn scan_repos(root: &Path) -> Result<Vec<RepoInfo>> {
    let entries = fs::read_dir(root)
        .with_context(|| format!("reading projects root {}", root.display()))?;

    let mut repos = Vec::new();
    for entry in entries {
        let entry = entry.context("reading directory entry")?;
        let path = entry.path();
        if !is_git_repo(&path) {
            continue;
        }

        let branch = current_branch(&path).await.ok();
        repos.push(RepoInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: path.to_string_lossy().into_owned(),
            branch,
        });
    }

    repos.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(repos)
}

/// Resolve the branch currently checked out in `repo`.
pub async fn current_branch(repo: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(repo)
        .output()
        .await
        .with_context(|| format!("running git rev-parse in {}", repo.display()))?;

    if !output.status.success() {
        return Err(anyhow!(
            "git rev-parse failed in {}: {}",
            repo.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
