//! Print the build order of packages.

use anyhow::Result;
use clap::Args;

use super::CliConfig;
use super::common::{RunArgs, RunContext};
use crate::resolver::{GraphBuilder, toposort};

/// Resolve packages and print them space-separated in build order.
#[derive(Args, Debug)]
pub struct OrderCommand {
    #[command(flatten)]
    pub(super) args: RunArgs,
}

impl OrderCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let ctx = RunContext::prepare(&self.args, cli).await?;
        let graph = GraphBuilder::new(&ctx.provider).build_graph(&self.args.packages).await?;
        let order = toposort::order(&graph)?;
        println!("{}", order.join(" "));
        Ok(())
    }
}
