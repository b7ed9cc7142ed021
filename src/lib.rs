//! debforge - dependency-ordered Debian package builds
//!
//! debforge builds the packages of a distribution from their git-buildpackage
//! release repositories. Given a set of package names it discovers everything
//! they depend on, orders the packages so that dependencies are built first, and
//! builds and installs each package that is not installed yet.
//!
//! # Architecture Overview
//!
//! ```text
//! CLI ─► GraphBuilder ─► toposort ─► Orchestrator ─► Toolchain / PackageIndex
//!             │                           │
//!             ▼                           ▼
//!     MetadataProvider              Workspace (checkout reconciliation)
//!      │      │     │
//!  index  cache  RemoteFetcher (raw HTTP, git export)
//! ```
//!
//! # Core Modules
//!
//! - [`distro`] - the distribution index, i.e. the known-package universe
//! - [`metadata`] - descriptor parsing, caching and retrieval
//! - [`resolver`] - dependency discovery and layered topological ordering
//! - [`checkout`] - workspace checkouts reconciled against the required revision
//! - [`builder`] - the recursive build-and-install pipeline
//!
//! ## Supporting Modules
//!
//! - [`cli`] - command-line interface
//! - [`config`] - `~/.debforge/config.toml` and environment overrides
//! - [`core`] - error taxonomy and Debian naming rules
//! - [`git`] - system `git` wrapper
//! - [`utils`] - file system, platform and progress helpers
//!
//! # Distribution Index
//!
//! ```yaml
//! name: groovy
//! platform: quantal
//! packages:
//!   rostime:
//!     url: https://github.com/ros-gbp/roscpp_core-release.git
//!     version: 0.3.12-0
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use debforge::config::BuildConfig;
//! use debforge::distro::DistributionIndex;
//! use debforge::metadata::MetadataProvider;
//! use debforge::resolver::{GraphBuilder, toposort};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = BuildConfig::load(None).await?;
//! let index = DistributionIndex::load("index.yaml").await?;
//! let provider = MetadataProvider::from_config(index, &config, true)?;
//!
//! let graph = GraphBuilder::new(&provider).build_graph(&["roscpp".to_string()]).await?;
//! println!("{}", toposort::order(&graph)?.join(" "));
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod checkout;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod distro;
pub mod git;
pub mod metadata;
pub mod resolver;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
