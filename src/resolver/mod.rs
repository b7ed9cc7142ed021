//! Dependency discovery and build ordering.
//!
//! [`GraphBuilder`] walks the dependency relation outward from the requested
//! packages, querying a [`PackageSource`] for each newly discovered name, and
//! produces a [`DependencyGraph`] closed under discovery. [`toposort`] turns that
//! graph into layers and a flat build order.
//!
//! ```rust,no_run
//! use debforge::resolver::{GraphBuilder, toposort};
//! # use debforge::metadata::PackageSource;
//!
//! # async fn example(source: &impl PackageSource) -> anyhow::Result<()> {
//! let graph = GraphBuilder::new(source).build_graph(&["roscpp".to_string()]).await?;
//! let order = toposort::order(&graph)?;
//! println!("{}", order.join(" "));
//! # Ok(())
//! # }
//! ```

pub mod toposort;

use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::core::{DebforgeError, PackageName};
use crate::metadata::PackageSource;

/// Package name → direct dependencies within the known-package universe.
pub type DependencyGraph = BTreeMap<PackageName, BTreeSet<PackageName>>;

/// Breadth-first discovery of the dependency graph.
pub struct GraphBuilder<'a, S> {
    source: &'a S,
}

impl<'a, S: PackageSource> GraphBuilder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
        }
    }

    /// Discover every package reachable from `roots`.
    ///
    /// Unknown roots and fetch failures abort discovery. A transitively discovered
    /// package whose descriptor cannot be parsed is left out of the graph along with
    /// every edge pointing at it.
    pub async fn build_graph(&self, roots: &[PackageName]) -> Result<DependencyGraph> {
        for root in roots {
            if !self.source.contains(root) {
                return Err(DebforgeError::PackageNotFound {
                    name: root.clone(),
                    suggestion: self.source.suggest(root),
                }
                .into());
            }
        }

        let mut graph = DependencyGraph::new();
        let mut excluded = BTreeSet::new();
        let mut pending: VecDeque<PackageName> = roots.iter().cloned().collect();

        while let Some(name) = pending.pop_front() {
            if graph.contains_key(&name) || excluded.contains(&name) {
                continue;
            }

            let metadata = match self.source.get_package(&name).await {
                Ok(metadata) => metadata,
                Err(e) if is_invalid_package(&e) && !roots.contains(&name) => {
                    tracing::warn!("Excluding {name} from the dependency graph: {e}");
                    excluded.insert(name);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let deps = self.known_dependencies(&name, metadata.dependencies());
            for dep in &deps {
                if !graph.contains_key(dep) {
                    pending.push_back(dep.clone());
                }
            }
            tracing::debug!("{name} depends on {}", format_set(&deps));
            graph.insert(name, deps);
        }

        if !excluded.is_empty() {
            for deps in graph.values_mut() {
                deps.retain(|dep| !excluded.contains(dep));
            }
        }

        Ok(graph)
    }

    /// Restrict `deps` to the universe and prune a self-reference.
    fn known_dependencies(&self, name: &str, deps: BTreeSet<PackageName>) -> BTreeSet<PackageName> {
        let mut known = BTreeSet::new();
        for dep in deps {
            if dep == name {
                tracing::warn!("Package {name} depends on itself, ignoring the self-dependency");
            } else if self.source.contains(&dep) {
                known.insert(dep);
            } else {
                tracing::warn!("Dependency {dep} of {name} is not in the distribution, skipping it");
            }
        }
        known
    }
}

fn is_invalid_package(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<DebforgeError>(), Some(DebforgeError::InvalidPackage { .. }))
}

pub(crate) fn format_set(set: &BTreeSet<PackageName>) -> String {
    if set.is_empty() {
        "nothing".to_string()
    } else {
        set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}
