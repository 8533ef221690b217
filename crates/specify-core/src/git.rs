//! Thin wrappers over the `git` executable.
//!
//! When `git` is not installed every query behaves as if `dir` were not a
//! repository, so non-git projects keep working.

use crate::error::{Result, SpecifyError};
use std::path::Path;
use std::process::{Command, Output};

pub fn is_available() -> bool {
    which::which("git").is_ok()
}

fn git(dir: &Path, args: &[&str]) -> std::io::Result<Output> {
    Command::new("git").args(args).current_dir(dir).output()
}

/// Run git and return trimmed stdout, or an error carrying stderr.
fn git_checked(dir: &Path, args: &[&str]) -> Result<String> {
    let output = git(dir, args).map_err(|e| SpecifyError::Git {
        command: args.join(" "),
        stderr: e.to_string(),
    })?;
    if !output.status.success() {
        return Err(SpecifyError::Git {
            command: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// True if `dir` is inside a git work tree.
pub fn is_repo(dir: &Path) -> bool {
    match git(dir, &["rev-parse", "--is-inside-work-tree"]) {
        Ok(out) => out.status.success() && String::from_utf8_lossy(&out.stdout).trim() == "true",
        Err(_) => false,
    }
}

/// Current branch name, or `None` outside a repository or on a detached HEAD.
pub fn current_branch(dir: &Path) -> Option<String> {
    let branch = git_checked(dir, &["rev-parse", "--abbrev-ref", "HEAD"]).ok()?;
    (!branch.is_empty() && branch != "HEAD").then_some(branch)
}

/// `git init`, stage everything, and create the initial commit.
pub fn init_repo(dir: &Path, message: &str) -> Result<()> {
    git_checked(dir, &["init"])?;
    git_checked(dir, &["add", "."])?;
    git_checked(dir, &["commit", "-q", "-m", message])?;
    tracing::info!(dir = %dir.display(), "initialized git repository");
    Ok(())
}

/// Create `name` from the current HEAD and switch to it.
pub fn create_branch(dir: &Path, name: &str) -> Result<()> {
    git_checked(dir, &["checkout", "-q", "-b", name])?;
    Ok(())
}

/// Names of all local and remote-tracking branches, remote prefix removed.
///
/// Remotes are fetched first (quietly, failures ignored) so numbering sees
/// branches pushed by others.
pub fn all_branch_names(dir: &Path) -> Vec<String> {
    let has_remotes = git_checked(dir, &["remote"])
        .map(|out| !out.is_empty())
        .unwrap_or(false);
    if has_remotes {
        if let Err(e) = git_checked(dir, &["fetch", "--all", "--prune", "--quiet"]) {
            tracing::debug!(error = %e, "git fetch failed; numbering from local refs only");
        }
    }

    let listing = match git_checked(
        dir,
        &["for-each-ref", "--format=%(refname)", "refs/heads", "refs/remotes"],
    ) {
        Ok(out) => out,
        Err(e) => {
            tracing::debug!(error = %e, "could not list branches");
            return Vec::new();
        }
    };
    parse_ref_listing(&listing)
}

fn parse_ref_listing(listing: &str) -> Vec<String> {
    let mut names: Vec<String> = listing
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if let Some(local) = line.strip_prefix("refs/heads/") {
                return Some(local.to_string());
            }
            let remote = line.strip_prefix("refs/remotes/")?;
            // drop the remote name
            let (_, branch) = remote.split_once('/')?;
            (branch != "HEAD").then(|| branch.to_string())
        })
        .collect();
    names.sort();
    names.dedup();
    names
}
