//! Workspace checkouts of release repositories.
//!
//! The workspace holds one working copy per release repository, named after the
//! last path segment of its URL. [`Workspace::reconcile`] brings a working copy to
//! the revision a package requires from whatever state a previous run left it in:
//!
//! | State | Action |
//! |-------|--------|
//! | [`CheckoutState::Absent`] | clone, then update to the revision |
//! | [`CheckoutState::PresentMatchingUrl`] | force-fetch and update; on failure recreate |
//! | [`CheckoutState::PresentMismatchedUrl`] | delete, clone, fetch and update |
//!
//! The revision is the short version label when the repository has an annotated
//! tag of that name and the full version label otherwise. Tag existence is checked again for
//! every attempt, since a fresh clone may know tags a stale copy does not.

use anyhow::Result;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::core::DebforgeError;
use crate::git::GitRepo;
use crate::metadata::CheckoutDescriptor;
use crate::utils::{ensure_dir, fs::remove_dir_all};

/// Provides working copies at a package's packaging revision.
pub trait CheckoutProvider {
    /// Reconcile the working copy of `package` and move it to `packaging_ref`.
    fn checkout(
        &self,
        package: &str,
        descriptor: &CheckoutDescriptor,
        packaging_ref: &str,
    ) -> impl Future<Output = Result<PathBuf>>;
}

/// State of a working copy before reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Absent,
    PresentMatchingUrl,
    PresentMismatchedUrl,
}

/// Directory of working copies.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Open `root`, creating it if missing.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self {
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Working copy location for a repository URL.
    ///
    /// Always a direct child of the root; URLs without a usable last segment
    /// (`file:///`, `host:`, `repo/.git`, `..`) are rejected.
    pub fn repo_path(&self, url: &str) -> Result<PathBuf> {
        let name = url.trim_end_matches('/').rsplit(['/', ':']).next().unwrap_or_default();
        let name = name.trim_end_matches(".git");
        if name.is_empty() || name == "." || name == ".." {
            anyhow::bail!("Can't derive a workspace directory from repository URL '{url}'");
        }
        Ok(self.root.join(name))
    }

    /// Inspect the working copy for `url`.
    pub async fn state(&self, url: &str) -> Result<CheckoutState> {
        let path = self.repo_path(url)?;
        if !path.exists() {
            return Ok(CheckoutState::Absent);
        }

        let repo = GitRepo::new(&path);
        if !repo.is_git_repo() {
            return Ok(CheckoutState::PresentMismatchedUrl);
        }
        Ok(match repo.get_remote_url().await {
            Ok(remote) if remote == url => CheckoutState::PresentMatchingUrl,
            Ok(remote) => {
                tracing::debug!(target: "git", "{} tracks {remote}, expected {url}", path.display());
                CheckoutState::PresentMismatchedUrl
            }
            Err(_) => CheckoutState::PresentMismatchedUrl,
        })
    }

    /// Bring the working copy of `package` to its required revision.
    pub async fn reconcile(&self, package: &str, descriptor: &CheckoutDescriptor) -> Result<PathBuf> {
        let url = descriptor.url.as_str();
        let path = self.repo_path(url).map_err(|e| checkout_error(package, url, &descriptor.full_version, &e))?;

        let state = self.state(url).await.map_err(|e| checkout_error(package, url, &descriptor.full_version, &e))?;
        match state {
            CheckoutState::Absent => {
                tracing::info!(target: "git", "Cloning {url} into {}", path.display());
                let revision = self.fresh_checkout(package, &path, descriptor, false).await?;
                tracing::debug!(target: "git", "{package} checked out at {revision}");
                return Ok(path);
            }
            CheckoutState::PresentMatchingUrl => {
                let repo = GitRepo::new(&path);
                let revision = resolve_revision(&repo, descriptor, true).await;
                match repo.update(&revision, true).await {
                    Ok(()) => {
                        tracing::debug!(target: "git", "{package} updated to {revision}");
                        return Ok(path);
                    }
                    Err(e) => {
                        tracing::warn!(
                            target: "git",
                            "Update of {} to {revision} failed, downloading it again: {e:#}",
                            path.display()
                        );
                    }
                }
            }
            CheckoutState::PresentMismatchedUrl => {
                tracing::warn!(
                    target: "git",
                    "Repository at {} does not track {url}, downloading it again",
                    path.display()
                );
            }
        }

        // Only ever discard this package's own copy
        if path.parent() != Some(self.root.as_path()) {
            let e = anyhow::anyhow!("{} is not inside workspace {}", path.display(), self.root.display());
            return Err(checkout_error(package, url, &descriptor.full_version, &e));
        }
        remove_dir_all(&path).await.map_err(|e| checkout_error(package, url, "", &e))?;
        let revision = self.fresh_checkout(package, &path, descriptor, true).await?;
        tracing::debug!(target: "git", "{package} recreated at {revision}");
        Ok(path)
    }

    /// Clone non-shallow and update to the resolved revision.
    async fn fresh_checkout(
        &self,
        package: &str,
        path: &Path,
        descriptor: &CheckoutDescriptor,
        fetch_first: bool,
    ) -> Result<String> {
        let url = descriptor.url.as_str();
        let repo = GitRepo::clone(url, path, None, false)
            .await
            .map_err(|e| checkout_error(package, url, &descriptor.short_version, &e))?;
        if fetch_first {
            repo.fetch(false)
                .await
                .map_err(|e| checkout_error(package, url, &descriptor.short_version, &e))?;
        }

        let revision = resolve_revision(&repo, descriptor, false).await;
        repo.update(&revision, false).await.map_err(|e| checkout_error(package, url, &revision, &e))?;
        Ok(revision)
    }
}

impl CheckoutProvider for Workspace {
    async fn checkout(
        &self,
        package: &str,
        descriptor: &CheckoutDescriptor,
        packaging_ref: &str,
    ) -> Result<PathBuf> {
        let path = self.reconcile(package, descriptor).await?;
        GitRepo::new(&path)
            .update(packaging_ref, false)
            .await
            .map_err(|e| checkout_error(package, &descriptor.url, packaging_ref, &e))?;
        Ok(path)
    }
}

/// Short label if it names a tag, the full label otherwise.
async fn resolve_revision(repo: &GitRepo, descriptor: &CheckoutDescriptor, query_remote: bool) -> String {
    match repo.is_tag(&descriptor.short_version, query_remote).await {
        Ok(true) => descriptor.short_version.clone(),
        Ok(false) => descriptor.full_version.clone(),
        Err(e) => {
            tracing::debug!(target: "git", "Tag lookup for {} failed: {e:#}", descriptor.short_version);
            descriptor.full_version.clone()
        }
    }
}

fn checkout_error(package: &str, url: &str, revision: &str, error: &anyhow::Error) -> anyhow::Error {
    DebforgeError::CheckoutError {
        package: package.to_string(),
        url: url.to_string(),
        revision: revision.to_string(),
        reason: format!("{error:#}"),
    }
    .into()
}
