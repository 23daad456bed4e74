// src/graph/validate.rs
//! Structural invariant checks over a finished graph.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::config::LayoutConfig;
use crate::model::{EdgeType, Graph, Level};

use super::cycles::detect_cycles;

/// Slack for floating point comparisons between box edges.
const OVERLAP_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    DuplicateNode(String),
    DuplicateEdge(String),
    DanglingEdge { edge: String, missing: String },
    MissingParent(String),
    MultipleParents { node: String, parents: usize },
    RootWithParent(String),
    ContainsCycle(Vec<String>),
    LevelSkip { edge: String },
    MissingPosition(String),
    Overlap { level: Level, a: String, b: String },
}

impl Violation {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::DuplicateNode(_) => "duplicate-node",
            Self::DuplicateEdge(_) => "duplicate-edge",
            Self::DanglingEdge { .. } => "dangling-edge",
            Self::MissingParent(_) => "missing-parent",
            Self::MultipleParents { .. } => "multiple-parents",
            Self::RootWithParent(_) => "root-with-parent",
            Self::ContainsCycle(_) => "contains-cycle",
            Self::LevelSkip { .. } => "level-skip",
            Self::MissingPosition(_) => "missing-position",
            Self::Overlap { .. } => "overlap",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.label())?;
        match self {
            Self::DuplicateNode(id) | Self::DuplicateEdge(id) => write!(f, "{id}"),
            Self::DanglingEdge { edge, missing } => write!(f, "{edge} references unknown {missing}"),
            Self::MissingParent(id) => write!(f, "{id} has no contains parent"),
            Self::MultipleParents { node, parents } => write!(f, "{node} has {parents} parents"),
            Self::RootWithParent(id) => write!(f, "business node {id} is contained"),
            Self::ContainsCycle(cycle) => write!(f, "{}", cycle.join(" -> ")),
            Self::LevelSkip { edge } => write!(f, "{edge} does not go exactly one level down"),
            Self::MissingPosition(id) => write!(f, "{id} has no position"),
            Self::Overlap { level, a, b } => write!(f, "{a} overlaps {b} in {}", level.label()),
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Checks ids, containment, level adjacency, positions and overlap.
#[must_use]
pub fn validate(graph: &Graph, layout: &LayoutConfig) -> ValidationReport {
    let mut violations = Vec::new();
    check_ids(graph, &mut violations);
    check_containment(graph, &mut violations);
    check_positions(graph, layout, &mut violations);
    ValidationReport { violations }
}

fn check_ids(graph: &Graph, out: &mut Vec<Violation>) {
    let mut nodes = BTreeSet::new();
    for node in &graph.nodes {
        if !nodes.insert(node.id.as_str()) {
            out.push(Violation::DuplicateNode(node.id.clone()));
        }
    }
    let mut edges = BTreeSet::new();
    for edge in &graph.edges {
        if !edges.insert(edge.id.as_str()) {
            out.push(Violation::DuplicateEdge(edge.id.clone()));
        }
        for end in [&edge.from, &edge.to] {
            if !nodes.contains(end.as_str()) {
                out.push(Violation::DanglingEdge {
                    edge: edge.id.clone(),
                    missing: end.clone(),
                });
            }
        }
    }
}

fn check_containment(graph: &Graph, out: &mut Vec<Violation>) {
    let levels: BTreeMap<&str, Level> = graph.nodes.iter().map(|n| (n.id.as_str(), n.level)).collect();
    let mut parents: BTreeMap<&str, usize> = BTreeMap::new();

    for edge in graph.edges_of(EdgeType::Contains) {
        *parents.entry(edge.to.as_str()).or_default() += 1;
        let (Some(from), Some(to)) = (levels.get(edge.from.as_str()), levels.get(edge.to.as_str()))
        else {
            continue;
        };
        if to.parent() != Some(*from) {
            out.push(Violation::LevelSkip {
                edge: edge.id.clone(),
            });
        }
    }

    for node in &graph.nodes {
        let count = parents.get(node.id.as_str()).copied().unwrap_or(0);
        match (node.level, count) {
            (Level::Business, 0) | (Level::System | Level::Implementation, 1) => {}
            (Level::Business, _) => out.push(Violation::RootWithParent(node.id.clone())),
            (_, 0) => out.push(Violation::MissingParent(node.id.clone())),
            (_, n) => out.push(Violation::MultipleParents {
                node: node.id.clone(),
                parents: n,
            }),
        }
    }

    let contains = graph
        .edges_of(EdgeType::Contains)
        .map(|e| (e.from.as_str(), e.to.as_str()));
    out.extend(detect_cycles(contains).into_iter().map(Violation::ContainsCycle));
}

fn check_positions(graph: &Graph, layout: &LayoutConfig, out: &mut Vec<Violation>) {
    let mut bands: BTreeMap<Level, Vec<(f64, &str)>> = BTreeMap::new();
    for node in &graph.nodes {
        match node.position {
            Some(p) => bands.entry(node.level).or_default().push((p.x, node.id.as_str())),
            None => out.push(Violation::MissingPosition(node.id.clone())),
        }
    }
    for (level, mut xs) in bands {
        let width = crate::layout::node_size(layout, level).width;
        xs.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        for pair in xs.windows(2) {
            let [(xa, a), (xb, b)] = pair else {
                continue;
            };
            if xb - xa < width - OVERLAP_EPSILON {
                out.push(Violation::Overlap {
                    level,
                    a: (*a).to_string(),
                    b: (*b).to_string(),
                });
            }
        }
    }
}
