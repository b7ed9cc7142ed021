//! Build and install packages.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use super::common::{RunArgs, RunContext};
use crate::builder::{AptIndex, BuildOutcome, Debuild, Orchestrator};
use crate::checkout::Workspace;
use crate::git::ensure_git_available;
use crate::metadata::PackageSource;
use crate::utils::ensure_command;

#[derive(Args, Debug)]
pub struct BuildCommand {
    #[command(flatten)]
    pub(super) args: RunArgs,
}

impl BuildCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        ensure_git_available()?;
        ensure_command("debuild")?;
        ensure_command("dpkg-checkbuilddeps")?;

        let ctx = RunContext::prepare(&self.args, cli).await?;
        let workspace = Workspace::new(&ctx.workspace)?;
        let toolchain = Debuild;
        let index = AptIndex::new(ctx.config.use_sudo);
        let mut orchestrator =
            Orchestrator::new(&ctx.provider, &workspace, &toolchain, &index, ctx.naming.clone())
                .with_progress(ctx.show_progress);

        for package in &self.args.packages {
            if !ctx.provider.contains(package) {
                match ctx.provider.suggest(package) {
                    Some(suggestion) => tracing::warn!(
                        "Skipping nonexistent package {package} (did you mean {suggestion}?)"
                    ),
                    None => tracing::warn!("Skipping nonexistent package {package}"),
                }
                continue;
            }

            match orchestrator.build(package, true).await? {
                BuildOutcome::Installed(deb) => {
                    println!("{} {package} ({})", "✓ Installed".green().bold(), deb.display());
                }
                BuildOutcome::AlreadyInstalled | BuildOutcome::BuiltThisRun => {
                    println!("{} {package}", "✓ Up to date".green());
                }
            }
        }

        let built = orchestrator.built().len();
        if built > 0 {
            println!("\n{}", format!("Built {built} package(s)").green().bold());
        }
        Ok(())
    }
}
