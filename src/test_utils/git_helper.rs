//! Git test helper utilities
//!
//! Provides a small synchronous wrapper around the `git` binary for building
//! fixture repositories in tests.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git command runner bound to one repository directory.
pub struct TestGit {
    repo_path: PathBuf,
}

impl TestGit {
    fn run_git_command(&self, args: &[&str], action: &str) -> Result<std::process::Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .with_context(|| action.to_string())?;

        if !output.status.success() {
            bail!("{} failed: {}", action, String::from_utf8_lossy(&output.stderr));
        }

        Ok(output)
    }

    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    /// Initialize a repository with `main` as the default branch and a test identity.
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(&self.repo_path).context("Failed to create repository directory")?;
        self.run_git_command(&["init", "--quiet"], "Failed to initialize git repository")?;
        self.run_git_command(
            &["symbolic-ref", "HEAD", "refs/heads/main"],
            "Failed to set default branch",
        )?;
        self.config_user()
    }

    pub fn config_user(&self) -> Result<()> {
        self.run_git_command(
            &["config", "user.email", "test@debforge.example"],
            "Failed to configure git user email",
        )?;
        self.run_git_command(&["config", "user.name", "Test User"], "Failed to configure git user name")?;
        self.run_git_command(&["config", "commit.gpgsign", "false"], "Failed to disable signing")?;
        self.run_git_command(&["config", "tag.gpgsign", "false"], "Failed to disable tag signing")?;
        Ok(())
    }

    /// Write `content` to `relative` inside the repository.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.repo_path.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn add_all(&self) -> Result<()> {
        self.run_git_command(&["add", "."], "Failed to add files to git")?;
        Ok(())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.run_git_command(&["commit", "--quiet", "-m", message], "Failed to create git commit")?;
        Ok(())
    }

    /// Create an annotated tag at HEAD.
    pub fn tag(&self, tag_name: &str) -> Result<()> {
        self.run_git_command(
            &["tag", "-a", tag_name, "-m", tag_name],
            &format!("Failed to create tag: {tag_name}"),
        )?;
        Ok(())
    }

    /// Create a lightweight tag at HEAD.
    pub fn lightweight_tag(&self, tag_name: &str) -> Result<()> {
        self.run_git_command(&["tag", tag_name], &format!("Failed to create tag: {tag_name}"))?;
        Ok(())
    }

    pub fn create_branch(&self, branch_name: &str) -> Result<()> {
        self.run_git_command(
            &["checkout", "--quiet", "-b", branch_name],
            &format!("Failed to create branch: {branch_name}"),
        )?;
        Ok(())
    }

    pub fn checkout(&self, ref_name: &str) -> Result<()> {
        self.run_git_command(&["checkout", "--quiet", ref_name], &format!("Failed to checkout: {ref_name}"))?;
        Ok(())
    }

    pub fn rev_parse(&self, ref_name: &str) -> Result<String> {
        let output = self.run_git_command(&["rev-parse", ref_name], "Failed to resolve ref")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn rev_parse_head(&self) -> Result<String> {
        self.rev_parse("HEAD")
    }

    pub fn remote_url(&self) -> Result<String> {
        let output = self.run_git_command(&["remote", "get-url", "origin"], "Failed to read remote url")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// `file://` URL of the repository.
    pub fn file_url(&self) -> String {
        format!("file://{}", self.repo_path.display())
    }
}
