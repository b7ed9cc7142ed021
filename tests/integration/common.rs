#![allow(dead_code)]

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use debforge::distro::{DistributionIndex, IndexEntry};
use debforge::test_utils::{ReleaseRepoFixture, package_xml};

/// A scratch directory holding a config file, an index, a workspace and a cache.
pub struct TestProject {
    _temp: TempDir,
    root: PathBuf,
    packages: BTreeMap<String, IndexEntry>,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        let root = temp.path().to_path_buf();
        let project = Self {
            _temp: temp,
            root,
            packages: BTreeMap::new(),
        };
        project.write_config("")?;
        Ok(project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join("index.yaml")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.root.join("cache").join("metadata_cache.json")
    }

    pub fn workspace_path(&self) -> PathBuf {
        self.root.join("workspace")
    }

    /// Write the config file with test paths, no fetch delay and `extra` appended.
    pub fn write_config(&self, extra: &str) -> Result<()> {
        let content = format!(
            "workspace = \"{}\"\ncache_path = \"{}\"\nfetch_delay_ms = 0\nuse_sudo = false\n{extra}",
            self.workspace_path().display(),
            self.cache_path().display(),
        );
        std::fs::write(self.config_path(), content).context("Failed to write config")
    }

    /// Add a package whose descriptor is carried inline by the index.
    pub fn inline_package(&mut self, name: &str, depends: &[&str]) -> &mut Self {
        self.packages.insert(
            name.to_string(),
            IndexEntry {
                url: format!("https://example.invalid/{name}-release.git"),
                version: "1.0.0-0".to_string(),
                short_version: None,
                package_xml: Some(package_xml(name, "1.0.0", depends, &[])),
            },
        );
        self
    }

    /// Add a package served from a release repository.
    pub fn repo_package(&mut self, repo: &ReleaseRepoFixture, full_version: &str) -> &mut Self {
        self.packages.insert(
            repo.package.clone(),
            IndexEntry {
                url: repo.url(),
                version: full_version.to_string(),
                short_version: None,
                package_xml: None,
            },
        );
        self
    }

    pub fn write_index(&self) -> Result<()> {
        let index = DistributionIndex {
            name: "groovy".to_string(),
            platform: Some("quantal".to_string()),
            packages: self.packages.clone(),
        };
        std::fs::write(self.index_path(), serde_yaml::to_string(&index)?).context("Failed to write index")
    }

    /// A release repository under `repos/` with one tagged release.
    pub fn release_repo(&self, package: &str, short_version: &str, depends: &[&str]) -> Result<ReleaseRepoFixture> {
        let repo = ReleaseRepoFixture::create(
            &self.root.join("repos"),
            &format!("{package}-release"),
            package,
            &[],
        )?;
        repo.release(short_version, depends)?;
        Ok(repo)
    }

    /// Run debforge with the project's config and index.
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let config = self.config_path();
        let index = self.index_path();
        let mut full_args = vec!["--config", config.to_str().context("non-UTF-8 path")?];
        full_args.extend_from_slice(args);
        full_args.extend_from_slice(&["--index", index.to_str().context("non-UTF-8 path")?]);
        self.run_raw(&full_args)
    }

    /// Run debforge with exactly `args`.
    pub fn run_raw(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.command().args(args).output().context("Failed to run debforge")?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }

    /// The binary with a clean environment rooted in the project.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_debforge"));
        cmd.current_dir(&self.root)
            .env("HOME", &self.root)
            .env("NO_COLOR", "1")
            .env("DEBFORGE_NO_PROGRESS", "1")
            .env_remove("DEBFORGE_CONFIG")
            .env_remove("DEBFORGE_INDEX")
            .env_remove("DEBFORGE_CACHE_PATH")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        assert!(self.success, "Command failed with code {:?}\nStderr: {}", self.code, self.stderr);
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(self.stdout.contains(text), "Expected stdout to contain '{text}'\nStdout: {}", self.stdout);
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(self.stderr.contains(text), "Expected stderr to contain '{text}'\nStderr: {}", self.stderr);
        self
    }
}
