//! Git operations wrapper for debforge
//!
//! This module wraps the system `git` binary, the same way Cargo does with
//! `git-fetch-with-cli`, so SSH agents, credential helpers and proxy settings of
//! the host apply unchanged.
//!
//! It exposes exactly the version-control operations the rest of the crate consumes:
//!
//! | Operation | Method |
//! |-----------|--------|
//! | test existence of a tag | [`GitRepo::is_tag`] |
//! | checkout at revision | [`GitRepo::clone`] (with `shallow` flag) |
//! | fetch and update to ref | [`GitRepo::update`] (with `force_fetch` flag) |
//! | read remote URL | [`GitRepo::get_remote_url`] |
//! | read file at revision | [`GitRepo::show_file`], [`read_file_at_revision`] |
//!
//! Every operation is awaited to completion without an intrinsic timeout.
//!
//! # Example
//!
//! ```rust,no_run
//! use debforge::git::GitRepo;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let repo = GitRepo::clone(
//!     "https://github.com/ros-gbp/roscpp_core-release.git",
//!     "/tmp/workspace/roscpp_core-release",
//!     None,
//!     false,
//! )
//! .await?;
//! let revision = if repo.is_tag("0.3.12", false).await? { "0.3.12" } else { "0.3.12-0" };
//! repo.update(revision, true).await?;
//! # Ok(())
//! # }
//! ```

pub mod command_builder;

use crate::core::DebforgeError;
use crate::git::command_builder::GitCommand;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// A local git working copy.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Clone `url` into `target`, optionally at a branch or tag.
    ///
    /// A shallow clone only carries the tip commit; the checkout reconciler
    /// always clones non-shallow because it updates to other refs afterwards.
    pub async fn clone(
        url: &str,
        target: impl AsRef<Path>,
        reference: Option<&str>,
        shallow: bool,
    ) -> Result<Self> {
        let target_path = target.as_ref();

        GitCommand::clone(url, target_path, reference, shallow)
            .with_context(url)
            .execute_success()
            .await
            .with_context(|| format!("Failed to clone {url} into {}", target_path.display()))?;

        Ok(Self::new(target_path))
    }

    /// Fetch all branches and tags from `origin`.
    ///
    /// With `force` set, local tags that moved on the remote are overwritten.
    pub async fn fetch(&self, force: bool) -> Result<()> {
        GitCommand::fetch(force).current_dir(&self.path).execute_success().await
    }

    /// Fetch and move the working copy to `ref_name`.
    ///
    /// Remote branches are checked out with `-B` so the local branch follows the
    /// remote; tags and commits are checked out detached.
    pub async fn update(&self, ref_name: &str, force_fetch: bool) -> Result<()> {
        self.fetch(force_fetch).await?;
        self.checkout(ref_name).await
    }

    /// Move the working copy to `ref_name` without fetching.
    pub async fn checkout(&self, ref_name: &str) -> Result<()> {
        // A dirty tree from an interrupted build would block the checkout
        if let Err(e) = GitCommand::reset_hard().current_dir(&self.path).execute().await {
            tracing::debug!(target: "git", "git reset failed in {}: {e}", self.path.display());
        }

        let remote_ref = format!("origin/{ref_name}");
        let is_remote_branch = GitCommand::verify_ref(&remote_ref)
            .current_dir(&self.path)
            .execute()
            .await
            .is_ok();

        if is_remote_branch
            && GitCommand::checkout_branch(ref_name, &remote_ref)
                .current_dir(&self.path)
                .execute_success()
                .await
                .is_ok()
        {
            return Ok(());
        }

        GitCommand::checkout(ref_name).current_dir(&self.path).execute_success().await
    }

    /// Whether `tag` names an annotated tag of this repository.
    ///
    /// Lightweight tags do not count. With `query_remote` set the remote is asked
    /// via `ls-remote`, which does not transfer any objects; otherwise only local
    /// refs are consulted.
    pub async fn is_tag(&self, tag: &str, query_remote: bool) -> Result<bool> {
        if query_remote {
            return Self::remote_has_tag_in(&self.path, "origin", tag).await;
        }
        let object_type = GitCommand::object_type(&format!("refs/tags/{tag}"))
            .current_dir(&self.path)
            .execute_stdout()
            .await;
        Ok(matches!(object_type.as_deref(), Ok("tag")))
    }

    async fn remote_has_tag_in(path: &Path, remote: &str, tag: &str) -> Result<bool> {
        let stdout = GitCommand::ls_remote_tag(remote, tag)
            .current_dir(path)
            .execute_stdout()
            .await
            .with_context(|| format!("Failed to list remote tags in {}", path.display()))?;
        Ok(!stdout.is_empty())
    }

    /// URL of the `origin` remote.
    pub async fn get_remote_url(&self) -> Result<String> {
        GitCommand::remote_url().current_dir(&self.path).execute_stdout().await
    }

    /// Content of `file` at `revision`.
    pub async fn show_file(&self, revision: &str, file: &str) -> Result<String> {
        let output = GitCommand::show_file(revision, file).current_dir(&self.path).execute().await?;
        Ok(output.stdout)
    }

    /// Whether the directory holds a git working copy.
    #[must_use]
    pub fn is_git_repo(&self) -> bool {
        self.path.join(".git").exists()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read a single file of a remote repository at `revision`.
///
/// The repository is cloned without a working tree into a scratch directory that
/// is removed afterwards. `revision` may be a tag, a branch or a commit.
pub async fn read_file_at_revision(url: &str, revision: &str, file: &str) -> Result<String> {
    let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
    let target = scratch.path().join("export");

    GitCommand::clone_no_checkout(url, &target)
        .with_context(url)
        .execute_success()
        .await
        .with_context(|| format!("Failed to clone {url}"))?;

    let repo = GitRepo::new(&target);
    match repo.show_file(revision, file).await {
        Ok(content) => Ok(content),
        Err(first) => {
            // Branches only exist as remote-tracking refs in a fresh clone
            let remote_ref = format!("origin/{revision}");
            repo.show_file(&remote_ref, file).await.map_err(|_| first).with_context(|| {
                format!("'{file}' does not exist at '{revision}' in {url}")
            })
        }
    }
}

/// Checks if Git is installed and accessible on the system.
#[must_use]
pub fn is_git_installed() -> bool {
    std::process::Command::new(crate::utils::platform::get_git_command())
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

pub fn ensure_git_available() -> Result<()> {
    if !is_git_installed() {
        return Err(DebforgeError::GitNotFound.into());
    }
    Ok(())
}

/// Parse owner and repository name from a hosted git URL.
///
/// Supports `https://host/owner/repo(.git)`, `git@host:owner/repo(.git)` and
/// `ssh://git@host/owner/repo(.git)`.
pub fn parse_git_url(url: &str) -> Result<(String, String)> {
    let url = url.trim_end_matches('/');

    // SSH shorthand like git@github.com:user/repo.git
    if !url.contains("://") && url.contains('@') {
        if let Some(colon_pos) = url.find(':') {
            let path = url[colon_pos + 1..].trim_end_matches(".git");
            if let Some((owner, repo)) = path.split_once('/') {
                return Ok((owner.to_string(), repo.to_string()));
            }
        }
    }

    if let Some((_, rest)) = url.split_once("://") {
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() >= 3 {
            let repo = parts[parts.len() - 1].trim_end_matches(".git");
            let owner = parts[parts.len() - 2];
            if !owner.is_empty() && !repo.is_empty() {
                return Ok((owner.to_string(), repo.to_string()));
            }
        }
    }

    Err(anyhow::anyhow!("Could not parse repository owner and name from URL: {url}"))
}
