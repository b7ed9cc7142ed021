//! Arguments and setup shared by the commands.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::CliConfig;
use crate::config::BuildConfig;
use crate::constants::DEFAULT_DISTRO;
use crate::core::{DebforgeError, DebianNaming, PackageName};
use crate::distro::DistributionIndex;
use crate::metadata::MetadataProvider;

/// Options common to every command.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory release repositories are checked out into
    #[arg(long)]
    pub workspace: Option<PathBuf>,

    /// Distribution identifier used in artifact names
    #[arg(long, default_value = DEFAULT_DISTRO)]
    pub distro: String,

    /// Distribution index (path or http(s) URL)
    #[arg(long)]
    pub index: Option<String>,

    /// Do not read descriptors from the metadata cache
    #[arg(long)]
    pub ignore_cache: bool,

    /// Packages to process
    #[arg(required = true, value_name = "PKG")]
    pub packages: Vec<PackageName>,
}

/// Everything a command needs to run.
pub struct RunContext {
    pub config: BuildConfig,
    pub provider: MetadataProvider,
    pub naming: DebianNaming,
    pub workspace: PathBuf,
    pub show_progress: bool,
}

impl RunContext {
    pub async fn prepare(args: &RunArgs, cli: &CliConfig) -> Result<Self> {
        let config = BuildConfig::load(cli.config_path.clone()).await?;

        let location = args.index.clone().or_else(|| config.index.clone()).ok_or_else(|| {
            DebforgeError::ConfigError {
                message: "No distribution index configured; pass --index or set DEBFORGE_INDEX".to_string(),
            }
        })?;
        let index = DistributionIndex::load(&location).await?;
        tracing::debug!("Loaded {} packages from {location}", index.packages.len());

        let platform = index.platform.clone().unwrap_or_else(|| config.platform.clone());
        let naming = DebianNaming::new(&args.distro, platform);
        let workspace = match &args.workspace {
            Some(dir) => dir.clone(),
            None => config.workspace_dir()?,
        };
        let provider = MetadataProvider::from_config(index, &config, !args.ignore_cache)?;

        Ok(Self {
            config,
            provider,
            naming,
            workspace,
            show_progress: !cli.no_progress,
        })
    }
}
