// src/graph/classify/prune.rs
//! Containment index and transitive-edge pruning.

use std::collections::BTreeMap;

use crate::model::{Edge, EdgeType, Level, Node};

/// Child → parent over level-adjacent `contains` edges.
#[derive(Debug, Default)]
pub struct ContainmentIndex<'a> {
    parent: BTreeMap<&'a str, &'a str>,
    level: BTreeMap<&'a str, Level>,
}

impl<'a> ContainmentIndex<'a> {
    /// The first level-adjacent `contains` edge per child wins.
    #[must_use]
    pub fn build(nodes: &'a [Node], edges: &'a [Edge]) -> Self {
        let level: BTreeMap<&str, Level> = nodes.iter().map(|n| (n.id.as_str(), n.level)).collect();
        let mut parent = BTreeMap::new();
        for edge in edges.iter().filter(|e| e.edge_type == EdgeType::Contains) {
            let (Some(from), Some(to)) = (level.get(edge.from.as_str()), level.get(edge.to.as_str()))
            else {
                continue;
            };
            if to.parent() == Some(*from) {
                parent.entry(edge.to.as_str()).or_insert(edge.from.as_str());
            }
        }
        Self { parent, level }
    }

    #[must_use]
    pub fn parent(&self, id: &str) -> Option<&'a str> {
        self.parent.get(id).copied()
    }

    #[must_use]
    pub fn level(&self, id: &str) -> Option<Level> {
        self.level.get(id).copied()
    }

    /// True when `ancestor` is reachable from `id` by walking parents.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        let mut current = id;
        // A well-formed tree is at most as deep as the number of levels.
        for _ in 0..Level::ALL.len() {
            match self.parent(current) {
                Some(p) if p == ancestor => return true,
                Some(p) => current = p,
                None => return false,
            }
        }
        false
    }

    fn span(&self, a: &str, b: &str) -> Option<usize> {
        Some(self.level(a)?.rank().abs_diff(self.level(b)?.rank()))
    }

    /// Keeps an edge unless it restates containment across levels.
    #[must_use]
    pub fn keeps(&self, edge: &Edge) -> bool {
        if edge.edge_type == EdgeType::Contains {
            return self.parent(&edge.to) == Some(edge.from.as_str());
        }
        let related = self.is_ancestor(&edge.from, &edge.to) || self.is_ancestor(&edge.to, &edge.from);
        !(related && self.span(&edge.from, &edge.to).is_some_and(|d| d >= 2))
    }
}

/// Drops redundant edges. Returns the kept edges and how many were dropped.
#[must_use]
pub fn prune(nodes: &[Node], edges: Vec<Edge>) -> (Vec<Edge>, usize) {
    let keep: Vec<bool> = {
        let index = ContainmentIndex::build(nodes, &edges);
        edges.iter().map(|e| index.keeps(e)).collect()
    };
    let before = edges.len();
    let kept: Vec<Edge> = edges
        .into_iter()
        .zip(keep)
        .filter_map(|(edge, keep)| keep.then_some(edge))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
