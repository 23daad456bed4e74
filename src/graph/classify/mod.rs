// src/graph/classify/mod.rs
//! Typed edges, System rollups, transitive pruning and degree.

pub mod prune;
pub mod rollup;

use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;
use tracing::debug;

use crate::config::RollupConfig;
use crate::graph::assemble::RawEdge;
use crate::graph::coupling;
use crate::model::{Edge, EdgeType, Graph, Level};

/// Counters from the classification stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyReport {
    pub raw: usize,
    pub rollups: usize,
    pub pruned: usize,
}

/// Adds classified raw edges and rollups to `graph`, prunes redundant edges,
/// annotates degree and puts edges in canonical `(type, id)` order.
pub fn classify(graph: &mut Graph, raw: &[RawEdge], config: &RollupConfig) -> ClassifyReport {
    let typed: Vec<Edge> = raw.iter().map(typed_edge).collect();
    let rollups = {
        let system_of = system_index(graph);
        rollup::rollup(raw, &system_of, config.max_examples)
    };
    let report_raw = typed.len();
    let report_rollups = rollups.len();

    let mut seen: BTreeSet<String> = graph.edges.iter().map(|e| e.id.clone()).collect();
    for edge in typed.into_iter().chain(rollups) {
        if seen.insert(edge.id.clone()) {
            graph.edges.push(edge);
        }
    }

    let (kept, pruned) = prune::prune(&graph.nodes, std::mem::take(&mut graph.edges));
    graph.edges = kept;
    graph
        .edges
        .sort_by(|a, b| (a.edge_type, &a.id).cmp(&(b.edge_type, &b.id)));

    annotate_degree(graph);

    debug!(raw = report_raw, rollups = report_rollups, pruned, "classified edges");
    ClassifyReport {
        raw: report_raw,
        rollups: report_rollups,
        pruned,
    }
}

fn typed_edge(raw: &RawEdge) -> Edge {
    let mut edge = Edge::new(&raw.from, &raw.to, raw.kind.edge_type(), raw.weight);
    edge.metadata.insert("source".into(), json!(raw.kind.label()));
    edge.metadata.insert("evidence".into(), json!(raw.evidence));
    edge
}

/// File → owning System, plus every System node → itself.
fn system_index(graph: &Graph) -> BTreeMap<&str, &str> {
    let index = graph.index();
    let mut system_of: BTreeMap<&str, &str> = graph
        .nodes_at(Level::System)
        .map(|n| (n.id.as_str(), n.id.as_str()))
        .collect();
    for edge in graph.edges_of(EdgeType::Contains) {
        let parent_is_system = index.get(edge.from.as_str()).is_some_and(|n| n.level == Level::System);
        if parent_is_system {
            system_of.entry(edge.to.as_str()).or_insert(edge.from.as_str());
        }
    }
    system_of
}

fn annotate_degree(graph: &mut Graph) {
    let degrees: BTreeMap<String, coupling::Degree> =
        coupling::compute_degree(graph.edges.iter().map(|e| (e.from.as_str(), e.to.as_str())))
            .into_iter()
            .map(|(id, d)| (id.to_string(), d))
            .collect();
    for node in &mut graph.nodes {
        let d = degrees.get(&node.id).copied().unwrap_or_default();
        node.annotate("degree", d.total());
        node.annotate("afferent", d.afferent());
        node.annotate("efferent", d.efferent());
    }
}
