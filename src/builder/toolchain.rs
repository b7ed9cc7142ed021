//! Seams to the system build toolchain and package database.

use anyhow::Result;
use std::future::Future;
use std::path::Path;

/// Exit status and captured output of an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Combined stdout and stderr.
    pub output: String,
}

impl CommandOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            output: String::new(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// Builds a package inside its checkout.
pub trait Toolchain {
    /// Build prerequisites of the checkout at `dir` that are not installed.
    fn missing_build_dependencies(&self, dir: &Path) -> impl Future<Output = Result<Vec<String>>>;

    fn clean(&self, dir: &Path) -> impl Future<Output = Result<CommandOutput>>;

    /// Produce the binary artifact next to the checkout.
    fn build(&self, dir: &Path) -> impl Future<Output = Result<CommandOutput>>;
}

/// The system's installed-package database and installer.
pub trait PackageIndex {
    /// Installed version of `name`; `None` when it is unknown or not installed.
    fn installed_version(&self, name: &str) -> impl Future<Output = Result<Option<String>>>;

    fn install_packages(&self, names: &[String]) -> impl Future<Output = Result<CommandOutput>>;

    /// Names of the packages an artifact file depends on.
    fn artifact_dependencies(&self, artifact: &Path) -> impl Future<Output = Result<Vec<String>>>;

    fn install_artifact(&self, artifact: &Path) -> impl Future<Output = Result<CommandOutput>>;
}
