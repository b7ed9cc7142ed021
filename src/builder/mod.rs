//! Recursive build-and-install orchestration.
//!
//! [`Orchestrator::build`] takes one package through the pipeline:
//!
//! 1. skip when the artifact is installed at exactly the required version
//! 2. with transitive building, build every dependency that is not installed
//!    (at any version) first, in build order
//! 3. check out the release repository at the packaging tag
//! 4. install missing build prerequisites
//! 5. clean and build
//! 6. locate the artifact, install its missing dependencies, install it
//!
//! Any failure aborts the request. A package is built at most once per
//! orchestrator, even when the installed-package index has not caught up.

pub mod debian;
pub mod toolchain;

pub use debian::{AptIndex, Debuild};
pub use toolchain::{CommandOutput, PackageIndex, Toolchain};

use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::checkout::CheckoutProvider;
use crate::core::{BuildStage, DebforgeError, DebianNaming, PackageName};
use crate::metadata::PackageSource;
use crate::resolver::{GraphBuilder, toposort};
use crate::utils::ProgressBar;

/// What [`Orchestrator::build`] did for a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The required version was already installed.
    AlreadyInstalled,
    /// Built earlier by this orchestrator.
    BuiltThisRun,
    /// Built and installed from this artifact.
    Installed(PathBuf),
}

/// Drives builds against a package source, workspace, toolchain and index.
pub struct Orchestrator<'a, S, C, T, I> {
    source: &'a S,
    checkouts: &'a C,
    toolchain: &'a T,
    index: &'a I,
    naming: DebianNaming,
    built: HashSet<PackageName>,
    show_progress: bool,
}

impl<'a, S, C, T, I> Orchestrator<'a, S, C, T, I>
where
    S: PackageSource,
    C: CheckoutProvider,
    T: Toolchain,
    I: PackageIndex,
{
    pub fn new(source: &'a S, checkouts: &'a C, toolchain: &'a T, index: &'a I, naming: DebianNaming) -> Self {
        Self {
            source,
            checkouts,
            toolchain,
            index,
            naming,
            built: HashSet::new(),
            show_progress: false,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Packages built so far.
    pub fn built(&self) -> &HashSet<PackageName> {
        &self.built
    }

    /// Build and install `package`, with its missing dependencies first when
    /// `transitive` is set.
    pub async fn build(&mut self, package: &str, transitive: bool) -> Result<BuildOutcome> {
        self.build_package(package, transitive, 0).await
    }

    async fn build_package(&mut self, package: &str, transitive: bool, depth: usize) -> Result<BuildOutcome> {
        let indent = "  ".repeat(depth);
        let descriptor = self.source.descriptor(package)?;
        let artifact = self.naming.artifact_name(package);
        let version = self.naming.installed_version(&descriptor.full_version);

        tracing::info!(target: "build", "{indent}Building package {package}");
        if self.built.contains(package) {
            tracing::info!(target: "build", "{indent}{package} was already built in this run");
            return Ok(BuildOutcome::BuiltThisRun);
        }
        if self.index.installed_version(&artifact).await?.as_deref() == Some(version.as_str()) {
            tracing::info!(
                target: "build",
                "{indent}{artifact} {version} is installed already, remove it to rebuild {package}"
            );
            return Ok(BuildOutcome::AlreadyInstalled);
        }
        tracing::debug!(target: "build", "{indent}{artifact} {version} is missing");

        if transitive {
            self.build_dependencies(package, depth).await?;
        }

        tracing::info!(target: "build", "{indent}Building {artifact} from {}", descriptor.url);
        let tag = self.naming.packaging_tag(package, &descriptor.full_version);
        let checkout = self.checkouts.checkout(package, &descriptor, &tag).await?;

        self.install_build_dependencies(package, &checkout).await?;
        self.run_toolchain(package, &checkout).await?;

        let prefix = self.naming.artifact_prefix(package, &descriptor.full_version);
        let deb = locate_artifact(package, &checkout, &prefix)?;
        self.install(package, &deb).await?;

        tracing::info!(target: "build", "{indent}Installed {}", deb.display());
        self.built.insert(package.to_string());
        Ok(BuildOutcome::Installed(deb))
    }

    async fn build_dependencies(&mut self, package: &str, depth: usize) -> Result<()> {
        let indent = "  ".repeat(depth);
        let graph = GraphBuilder::new(self.source).build_graph(&[package.to_string()]).await?;
        let order = toposort::order(&graph)?;

        tracing::info!(target: "build", "{indent}Checking dependencies of {package}");
        for dep in order.iter().filter(|dep| dep.as_str() != package) {
            let artifact = self.naming.artifact_name(dep);
            match self.index.installed_version(&artifact).await? {
                Some(installed) => {
                    tracing::info!(target: "build", "{indent}  {dep}: OK (installed version {installed})");
                }
                None if self.built.contains(dep) => {
                    tracing::info!(target: "build", "{indent}  {dep}: OK (built in this run)");
                }
                None => {
                    tracing::info!(target: "build", "{indent}  {dep}: needs build");
                    Box::pin(self.build_package(dep, false, depth + 1)).await?;
                }
            }
        }
        tracing::info!(target: "build", "{indent}Dependencies of {package} are satisfied");
        Ok(())
    }

    async fn install_build_dependencies(&self, package: &str, checkout: &Path) -> Result<()> {
        let missing = self.toolchain.missing_build_dependencies(checkout).await?;
        if missing.is_empty() {
            return Ok(());
        }

        tracing::warn!(target: "build", "Installing missing build dependencies: {}", missing.join(" "));
        let result = self.index.install_packages(&missing).await?;
        let still_missing = if result.success {
            self.toolchain.missing_build_dependencies(checkout).await?
        } else {
            missing
        };

        if still_missing.is_empty() {
            Ok(())
        } else {
            Err(DebforgeError::BuildDependencyError {
                package: package.to_string(),
                missing: still_missing,
                output: result.output,
            }
            .into())
        }
    }

    async fn run_toolchain(&self, package: &str, checkout: &Path) -> Result<()> {
        let spinner = ProgressBar::new_spinner(self.show_progress);
        spinner.set_prefix(package.to_string());

        for stage in [BuildStage::Clean, BuildStage::Build] {
            spinner.set_message(format!("running {stage}"));
            let result = match stage {
                BuildStage::Clean => self.toolchain.clean(checkout).await,
                _ => self.toolchain.build(checkout).await,
            };
            let result = match result {
                Ok(result) => result,
                Err(e) => {
                    spinner.finish_and_clear();
                    return Err(e);
                }
            };
            if !result.success {
                spinner.finish_and_clear();
                return Err(DebforgeError::BuildError {
                    package: package.to_string(),
                    stage,
                    output: result.output,
                }
                .into());
            }
        }

        spinner.finish_and_clear();
        Ok(())
    }

    async fn install(&self, package: &str, deb: &Path) -> Result<()> {
        let mut missing = Vec::new();
        for dep in self.index.artifact_dependencies(deb).await? {
            if self.index.installed_version(&dep).await?.is_none() {
                missing.push(dep);
            }
        }

        if !missing.is_empty() {
            tracing::info!(target: "build", "Installing dependencies of {}: {}", deb.display(), missing.join(" "));
            let result = self.index.install_packages(&missing).await?;
            if !result.success {
                return Err(DebforgeError::InstallError {
                    package: package.to_string(),
                    stage: BuildStage::ArtifactDependencies,
                    output: result.output,
                }
                .into());
            }
        }

        let result = self.index.install_artifact(deb).await?;
        if !result.success {
            return Err(DebforgeError::InstallError {
                package: package.to_string(),
                stage: BuildStage::Install,
                output: result.output,
            }
            .into());
        }
        Ok(())
    }
}

/// First artifact next to the checkout whose file name starts with `prefix`.
fn locate_artifact(package: &str, checkout: &Path, prefix: &str) -> Result<PathBuf> {
    let dir = checkout.parent().unwrap_or(checkout);
    let pattern = format!("{}/{}*.deb", glob::Pattern::escape(&dir.to_string_lossy()), glob::Pattern::escape(prefix));

    let mut matches: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| anyhow::anyhow!("Invalid artifact pattern {pattern}: {e}"))?
        .filter_map(std::result::Result::ok)
        .collect();
    matches.sort();

    matches.into_iter().next().ok_or_else(|| {
        DebforgeError::ArtifactNotFound {
            package: package.to_string(),
            pattern,
        }
        .into()
    })
}
