//! Print the dependency graph of packages.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use super::common::{RunArgs, RunContext};
use crate::resolver::{DependencyGraph, GraphBuilder, toposort};

#[derive(Args, Debug)]
pub struct GraphCommand {
    #[command(flatten)]
    pub(super) args: RunArgs,
}

impl GraphCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let ctx = RunContext::prepare(&self.args, cli).await?;
        let graph = GraphBuilder::new(&ctx.provider).build_graph(&self.args.packages).await?;
        print!("{}", render(&graph)?);
        Ok(())
    }
}

/// One block per layer, one line per package with its direct dependencies.
fn render(graph: &DependencyGraph) -> Result<String> {
    let mut out = String::new();
    for (i, layer) in toposort::layers(graph)?.iter().enumerate() {
        out.push_str(&format!("{}\n", format!("Layer {i}").bold()));
        for package in layer {
            let deps = &graph[package];
            if deps.is_empty() {
                out.push_str(&format!("  {package}\n"));
            } else {
                let deps: Vec<_> = deps.iter().map(String::as_str).collect();
                out.push_str(&format!("  {package} -> {}\n", deps.join(", ")));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_layers() {
        colored::control::set_override(false);
        let graph: DependencyGraph = [
            ("a".to_string(), Default::default()),
            ("b".to_string(), ["a".to_string()].into()),
            ("c".to_string(), ["a".to_string(), "b".to_string()].into()),
        ]
        .into();

        assert_eq!(render(&graph).unwrap(), "Layer 0\n  a\nLayer 1\n  b -> a\nLayer 2\n  c -> a, b\n");
    }
}
