//! Layered topological sort.
//!
//! Each layer holds the packages whose remaining dependencies are all placed in
//! earlier layers. Layers are `BTreeSet`s, so the flattened order is stable for a
//! given graph. When no layer can be extracted but packages remain, the remainder
//! is reported as a [`DebforgeError::CycleError`] instead of guessing an order.

use anyhow::Result;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use std::collections::{BTreeMap, BTreeSet};

use super::{DependencyGraph, format_set};
use crate::core::{DebforgeError, PackageName};

/// Sort `graph` into layers.
///
/// Edges to packages outside the key set are dropped first. A package that still
/// depends on itself is rejected.
pub fn layers(graph: &DependencyGraph) -> Result<Vec<BTreeSet<PackageName>>> {
    let self_dependent: BTreeMap<_, _> = graph
        .iter()
        .filter(|(name, deps)| deps.contains(*name))
        .map(|(name, _)| (name.clone(), BTreeSet::from([name.clone()])))
        .collect();
    if !self_dependent.is_empty() {
        return Err(DebforgeError::CycleError {
            residual: self_dependent,
        }
        .into());
    }

    let mut remaining: DependencyGraph = graph
        .iter()
        .map(|(name, deps)| {
            let known = deps.iter().filter(|dep| graph.contains_key(*dep)).cloned().collect();
            (name.clone(), known)
        })
        .collect();

    let mut layers = Vec::new();
    while !remaining.is_empty() {
        let layer: BTreeSet<PackageName> =
            remaining.iter().filter(|(_, deps)| deps.is_empty()).map(|(name, _)| name.clone()).collect();

        if layer.is_empty() {
            log_cycles(&remaining);
            return Err(DebforgeError::CycleError {
                residual: remaining,
            }
            .into());
        }

        remaining.retain(|name, _| !layer.contains(name));
        for deps in remaining.values_mut() {
            deps.retain(|dep| !layer.contains(dep));
        }
        tracing::trace!("Layer {}: {}", layers.len(), format_set(&layer));
        layers.push(layer);
    }

    Ok(layers)
}

/// Flattened build order: every package appears after all of its dependencies.
pub fn order(graph: &DependencyGraph) -> Result<Vec<PackageName>> {
    Ok(layers(graph)?.into_iter().flatten().collect())
}

/// Report the strongly connected components of the unorderable remainder.
fn log_cycles(residual: &DependencyGraph) {
    let mut g = DiGraphMap::<&str, ()>::new();
    for (name, deps) in residual {
        g.add_node(name.as_str());
        for dep in deps {
            g.add_edge(name.as_str(), dep.as_str(), ());
        }
    }

    for component in tarjan_scc(&g) {
        if component.len() > 1 {
            let mut members: Vec<_> = component.into_iter().collect();
            members.sort_unstable();
            tracing::error!("Circular dependency among: {}", members.join(" → "));
        }
    }
}
