//! Command-line interface for debforge
//!
//! # Commands
//!
//! - `order` - print the build order of packages and their dependencies
//! - `graph` - print the dependency graph layer by layer
//! - `build` - build and install packages with their missing dependencies
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - errors only
//! - `--config` / `-c` - configuration file
//! - `--no-progress` - hide spinners
//!
//! `RUST_LOG` takes precedence over `--verbose` and `--quiet`.

mod build;
pub mod common;
mod graph;
mod order;
#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings derived from the global flags, passed to every command.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Filter directive for logging; `None` means errors only.
    pub log_level: Option<String>,
    pub no_progress: bool,
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.log_level.as_deref().unwrap_or("error"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }
}

#[derive(Parser)]
#[command(
    name = "debforge",
    about = "Resolve, order and build Debian packages from release repositories",
    version,
    long_about = "debforge discovers the transitive dependencies of distribution packages, \
                  orders them for building and builds and installs each missing one from its \
                  git-buildpackage release repository."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable progress spinners
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the build order of packages and everything they depend on
    Order(order::OrderCommand),

    /// Print the dependency graph of packages layer by layer
    Graph(graph::GraphCommand),

    /// Build and install packages and their missing dependencies
    Build(build::BuildCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Order(cmd) => cmd.execute(&config).await,
            Commands::Graph(cmd) => cmd.execute(&config).await,
            Commands::Build(cmd) => cmd.execute(&config).await,
        }
    }
}
