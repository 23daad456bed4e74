// src/model/mod.rs
//! Node and edge records shared by every pipeline stage.

pub mod diagnostics;
pub mod ids;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use self::diagnostics::{
    DegenerateReport, Diagnostics, LayoutOverflow, ReferenceKind, UnresolvedReference,
};

/// Open metadata bag. Ordered so serialization is byte-stable.
pub type Metadata = BTreeMap<String, Value>;

/// The three tiers of the graph, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    Business,
    System,
    Implementation,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Business, Level::System, Level::Implementation];

    /// Depth below the top band (Business = 0).
    #[must_use]
    pub fn rank(self) -> usize {
        match self {
            Self::Business => 0,
            Self::System => 1,
            Self::Implementation => 2,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Business => "BUSINESS",
            Self::System => "SYSTEM",
            Self::Implementation => "IMPLEMENTATION",
        }
    }

    /// The level directly above, if any.
    #[must_use]
    pub fn parent(self) -> Option<Level> {
        match self {
            Self::Business => None,
            Self::System => Some(Self::Business),
            Self::Implementation => Some(Self::System),
        }
    }

    /// Parses a case-insensitive level name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Level> {
        match s.to_ascii_lowercase().as_str() {
            "business" => Some(Self::Business),
            "system" => Some(Self::System),
            "implementation" | "impl" => Some(Self::Implementation),
            _ => None,
        }
    }
}

/// Entity kinds, including the external stub kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Domain,
    Service,
    Module,
    Cluster,
    File,
    Class,
    #[serde(rename = "Function_Group")]
    FunctionGroup,
    #[serde(rename = "External_API")]
    ExternalApi,
    #[serde(rename = "LLM_Service")]
    LlmService,
    #[serde(rename = "Auth_Provider")]
    AuthProvider,
    #[serde(rename = "Managed_DB")]
    ManagedDb,
    User,
}

impl NodeKind {
    /// Stub kinds recognized for kind-based filtering.
    pub const EXTERNAL: [NodeKind; 5] = [
        NodeKind::ExternalApi,
        NodeKind::LlmService,
        NodeKind::AuthProvider,
        NodeKind::ManagedDb,
        NodeKind::User,
    ];

    #[must_use]
    pub fn is_external(self) -> bool {
        Self::EXTERNAL.contains(&self)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Domain => "Domain",
            Self::Service => "Service",
            Self::Module => "Module",
            Self::Cluster => "Cluster",
            Self::File => "File",
            Self::Class => "Class",
            Self::FunctionGroup => "Function_Group",
            Self::ExternalApi => "External_API",
            Self::LlmService => "LLM_Service",
            Self::AuthProvider => "Auth_Provider",
            Self::ManagedDb => "Managed_DB",
            Self::User => "User",
        }
    }

    /// Display name used for stub nodes of this kind.
    #[must_use]
    pub fn stub_name(self) -> &'static str {
        match self {
            Self::ExternalApi => "External API",
            Self::LlmService => "LLM Service",
            Self::AuthProvider => "Auth Provider",
            Self::ManagedDb => "Managed Database",
            Self::User => "User",
            _ => self.label(),
        }
    }
}

/// Edge classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Contains,
    DependsOn,
    Calls,
}

impl EdgeType {
    pub const ALL: [EdgeType; 3] = [EdgeType::Contains, EdgeType::DependsOn, EdgeType::Calls];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::DependsOn => "depends_on",
            Self::Calls => "calls",
        }
    }

    /// The edge type shown by default when viewing a given level.
    #[must_use]
    pub fn default_for(level: Level) -> EdgeType {
        match level {
            Level::Business => Self::Contains,
            Level::System => Self::DependsOn,
            Level::Implementation => Self::Calls,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub level: Level,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Node {
    #[must_use]
    pub fn new(id: String, name: impl Into<String>, kind: NodeKind, level: Level) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            level,
            members: Vec::new(),
            position: None,
            color: None,
            external: kind.is_external(),
            purpose: None,
            responsibilities: None,
            metadata: Metadata::new(),
        }
    }

    /// Adds a metadata fact. Existing keys are never overwritten.
    pub fn annotate(&mut self, key: &str, value: impl Into<Value>) -> bool {
        if self.metadata.contains_key(key) {
            return false;
        }
        self.metadata.insert(key.to_string(), value.into());
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    pub weight: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Edge {
    #[must_use]
    pub fn new(from: &str, to: &str, edge_type: EdgeType, weight: u32) -> Self {
        Self {
            id: ids::edge_id(edge_type, from, to),
            from: from.to_string(),
            to: to.to_string(),
            edge_type,
            weight: weight.max(1),
            color: None,
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub fn contains(parent: &str, child: &str) -> Self {
        Self::new(parent, child, EdgeType::Contains, 1)
    }
}

/// Vertical extent of one band plus its horizontal span after placement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandInfo {
    pub top: f64,
    pub center_y: f64,
    pub height: f64,
    pub left: f64,
    pub right: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub coverage_percentage: f64,
    pub level_counts: BTreeMap<Level, usize>,
    pub layout_bands: BTreeMap<Level, BandInfo>,
    pub edge_type_counts: BTreeMap<EdgeType, usize>,
    pub default_edge_types: BTreeMap<Level, EdgeType>,
    pub external_kinds: BTreeMap<NodeKind, Vec<String>>,
    pub input_digest: String,
    pub engine_version: String,
    pub diagnostics: Diagnostics,
}

/// The finished three-tier graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub metadata: GraphMetadata,
}

impl Graph {
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Ids → nodes, for repeated lookups.
    #[must_use]
    pub fn index(&self) -> BTreeMap<&str, &Node> {
        self.nodes.iter().map(|n| (n.id.as_str(), n)).collect()
    }

    pub fn nodes_at(&self, level: Level) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.level == level)
    }

    pub fn edges_of(&self, edge_type: EdgeType) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.edge_type == edge_type)
    }

    /// Child → parent over `contains` edges.
    #[must_use]
    pub fn parents(&self) -> BTreeMap<&str, &str> {
        self.edges_of(EdgeType::Contains)
            .map(|e| (e.to.as_str(), e.from.as_str()))
            .collect()
    }

    /// Restricts the graph to nodes at or above `level` and the edges among
    /// them. A System view therefore hides raw Implementation edges.
    #[must_use]
    pub fn view(&self, level: Level) -> Graph {
        let nodes: Vec<Node> = self
            .nodes
            .iter()
            .filter(|n| n.level <= level)
            .cloned()
            .collect();
        let kept: BTreeSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| kept.contains(e.from.as_str()) && kept.contains(e.to.as_str()))
            .cloned()
            .collect();
        Graph {
            nodes,
            edges,
            metadata: self.metadata.clone(),
        }
    }

    /// Recomputes level and edge-type counters from the current content.
    pub fn refresh_counts(&mut self) {
        let mut level_counts: BTreeMap<Level, usize> =
            Level::ALL.iter().map(|l| (*l, 0)).collect();
        for node in &self.nodes {
            *level_counts.entry(node.level).or_default() += 1;
        }
        let mut edge_counts: BTreeMap<EdgeType, usize> =
            EdgeType::ALL.iter().map(|t| (*t, 0)).collect();
        for edge in &self.edges {
            *edge_counts.entry(edge.edge_type).or_default() += 1;
        }

        let mut external_kinds: BTreeMap<NodeKind, Vec<String>> = BTreeMap::new();
        for node in self.nodes.iter().filter(|n| n.external) {
            external_kinds.entry(node.kind).or_default().push(node.id.clone());
        }

        self.metadata.level_counts = level_counts;
        self.metadata.edge_type_counts = edge_counts;
        self.metadata.external_kinds = external_kinds;
        self.metadata.default_edge_types = Level::ALL
            .iter()
            .map(|l| (*l, EdgeType::default_for(*l)))
            .collect();
    }

    /// Canonical JSON encoding of the artifact.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self, pretty: bool) -> crate::error::Result<String> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph {
        let mut b = Node::new("business:core".into(), "Core", NodeKind::Domain, Level::Business);
        b.members = vec!["system:api".into()];
        let mut s = Node::new("system:api".into(), "Api", NodeKind::Service, Level::System);
        s.members = vec!["impl:api/a.py".into(), "impl:api/b.py".into()];
        let a = Node::new("impl:api/a.py".into(), "a.py", NodeKind::File, Level::Implementation);
        let c = Node::new("impl:api/b.py".into(), "b.py", NodeKind::File, Level::Implementation);
        Graph {
            nodes: vec![b, s, a, c],
            edges: vec![
                Edge::contains("business:core", "system:api"),
                Edge::contains("system:api", "impl:api/a.py"),
                Edge::contains("system:api", "impl:api/b.py"),
                Edge::new("impl:api/a.py", "impl:api/b.py", EdgeType::Calls, 2),
            ],
            metadata: GraphMetadata::default(),
        }
    }

    #[test]
    fn test_system_view_hides_implementation_edges() {
        let graph = sample();
        let view = graph.view(Level::System);
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.edges.len(), 1);
        assert!(view.edges.iter().all(|e| e.edge_type == EdgeType::Contains));
    }

    #[test]
    fn test_annotate_is_additive() {
        let mut node = Node::new("impl:x".into(), "x", NodeKind::File, Level::Implementation);
        assert!(node.annotate("degree", 3));
        assert!(!node.annotate("degree", 9));
        assert_eq!(node.metadata.get("degree"), Some(&Value::from(3)));
    }

    #[test]
    fn test_refresh_counts() {
        let mut graph = sample();
        graph.refresh_counts();
        assert_eq!(graph.metadata.level_counts.get(&Level::Implementation), Some(&2));
        assert_eq!(graph.metadata.edge_type_counts.get(&EdgeType::Contains), Some(&3));
        assert_eq!(
            graph.metadata.default_edge_types.get(&Level::System),
            Some(&EdgeType::DependsOn)
        );
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&NodeKind::LlmService).unwrap_or_default();
        assert_eq!(json, "\"LLM_Service\"");
        let json = serde_json::to_string(&Level::Implementation).unwrap_or_default();
        assert_eq!(json, "\"IMPLEMENTATION\"");
        let json = serde_json::to_string(&EdgeType::DependsOn).unwrap_or_default();
        assert_eq!(json, "\"depends_on\"");
    }
}
