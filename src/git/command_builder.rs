//! Type-safe Git command builder for consistent command execution
//!
//! This module provides a fluent API for building and executing Git commands so
//! every call site gets the same logging, error typing and output capture.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::core::DebforgeError;
use crate::utils::platform::get_git_command;

/// Builder for a single `git` invocation.
///
/// ```rust,ignore
/// use debforge::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let url = GitCommand::remote_url()
///     .current_dir("/path/to/repo")
///     .execute_stdout()
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// Commands run to completion; cancellation is left to the caller.
pub struct GitCommand {
    /// Command arguments to pass to Git (e.g., ["clone", "url", "path"])
    args: Vec<String>,

    /// Working directory, passed to git with `-C`
    current_dir: Option<PathBuf>,

    /// Environment variables to set for the Git process
    env_vars: Vec<(String, String)>,

    /// Optional context string for log messages (typically the package name)
    context: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            // Never prompt for credentials; a prompt would block the run forever
            env_vars: vec![("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())],
            context: None,
        }
    }
}

impl GitCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set a context for logging (e.g., package name)
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn full_args(&self) -> Vec<String> {
        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            // -C keeps git independent of the process working directory
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        full_args
    }

    /// Run git and capture its output; a non-zero exit is a `GitCommandError`.
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let started = std::time::Instant::now();
        let git = get_git_command();
        let full_args = self.full_args();
        let label = self.context.as_deref().map(|ctx| format!("({ctx}) ")).unwrap_or_default();
        tracing::debug!(target: "git", "{label}git {}", full_args.join(" "));

        let mut cmd = Command::new(git);
        cmd.args(&full_args)
            .envs(self.env_vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = cmd.output().await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => anyhow::Error::from(DebforgeError::GitNotFound),
            _ => anyhow::Error::from(e).context(format!("Failed to spawn git {}", full_args.join(" "))),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "git",
                "{label}git {} exited with {:?}: {}",
                self.args.join(" "),
                output.status.code(),
                stderr.trim()
            );
            return Err(DebforgeError::GitCommandError {
                operation: self.args.join(" "),
                stderr: if stderr.trim().is_empty() { stdout } else { stderr },
            }
            .into());
        }

        if !stdout.is_empty() {
            tracing::trace!(target: "git", "{label}{}", stdout.trim());
        }
        let elapsed = started.elapsed();
        if elapsed.as_secs() > 1 {
            let operation = self.args.first().map_or("", String::as_str);
            tracing::debug!(target: "git", "{label}git {operation} took {:.2}s", elapsed.as_secs_f64());
        }

        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Execute and return trimmed stdout.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Execute and discard output.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Captured output of a successful git command.
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

// Convenience builders for common Git operations

impl GitCommand {
    /// Clone `url` into `target`.
    ///
    /// `reference` selects a branch or tag to check out; `shallow` limits the
    /// history to a single commit.
    pub fn clone(url: &str, target: impl AsRef<Path>, reference: Option<&str>, shallow: bool) -> Self {
        let mut cmd = Self::new().args(["clone", "--quiet"]);
        if shallow {
            cmd = cmd.args(["--depth", "1"]);
        }
        if let Some(reference) = reference {
            cmd = cmd.args(["--branch", reference]);
        }
        cmd.arg(url).arg(target.as_ref().display().to_string())
    }

    /// Clone only the object database, leaving the working tree empty.
    pub fn clone_no_checkout(url: &str, target: impl AsRef<Path>) -> Self {
        Self::new()
            .args(["clone", "--quiet", "--no-checkout", "--filter=blob:none", url])
            .arg(target.as_ref().display().to_string())
    }

    pub fn fetch(force: bool) -> Self {
        let cmd = Self::new().args(["fetch", "origin", "--tags"]);
        if force {
            cmd.arg("--force")
        } else {
            cmd
        }
    }

    pub fn checkout(ref_name: &str) -> Self {
        Self::new().args(["checkout", "--quiet", ref_name])
    }

    pub fn checkout_branch(branch_name: &str, remote_ref: &str) -> Self {
        Self::new().args(["checkout", "--quiet", "-B", branch_name, remote_ref])
    }

    pub fn reset_hard() -> Self {
        Self::new().args(["reset", "--hard", "--quiet", "HEAD"])
    }

    pub fn remote_url() -> Self {
        Self::new().args(["remote", "get-url", "origin"])
    }

    pub fn verify_ref(ref_name: &str) -> Self {
        Self::new().args(["rev-parse", "--verify", "--quiet", ref_name])
    }

    /// List the peeled entry of tag `tag` on a remote without fetching anything.
    ///
    /// Only annotated tags have a peeled (`^{}`) entry.
    pub fn ls_remote_tag(remote: &str, tag: &str) -> Self {
        Self::new().args(["ls-remote", "--tags", remote]).arg(format!("refs/tags/{tag}^{{}}"))
    }

    /// Print the object type `ref_name` points at.
    pub fn object_type(ref_name: &str) -> Self {
        Self::new().args(["cat-file", "-t", ref_name])
    }

    /// Print the content of `path` at `revision`.
    pub fn show_file(revision: &str, path: &str) -> Self {
        Self::new().args(["show", &format!("{revision}:{path}")])
    }
}
