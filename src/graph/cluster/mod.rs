// src/graph/cluster/mod.rs
//! System clusters and Business domains over the assembled Implementation band.

pub mod directory;
pub mod domains;
pub mod modularity;
pub mod union_find;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::ClusterConfig;
use crate::model::ids::{self, IdAllocator};
use crate::model::{DegenerateReport, Edge, EdgeType, Level, Node, NodeKind};

use super::assemble::{Assembly, RawKind};

static SERVICE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)service|api|server|worker").unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// How a System cluster was formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Modularity,
    Directory,
}

impl Origin {
    fn label(self) -> &'static str {
        match self {
            Self::Modularity => "modularity",
            Self::Directory => "directory",
        }
    }
}

/// Output of the clustering stage.
#[derive(Debug, Default)]
pub struct Clustering {
    /// Domains in creation order; the external domain, if any, is last.
    pub business: Vec<Node>,
    /// Clusters ordered by their smallest member path.
    pub systems: Vec<Node>,
    /// The `User` actor stub, when created.
    pub actor: Option<Node>,
    pub contains: Vec<Edge>,
    /// `depends_on` edges from the actor to interface clusters.
    pub actor_edges: Vec<Edge>,
    pub coverage: f64,
    pub degenerate: Option<DegenerateReport>,
}

/// Clusters files into Systems and Systems into Business domains.
#[must_use]
pub fn cluster(assembly: &Assembly, config: &ClusterConfig) -> Clustering {
    let paths: Vec<&str> = assembly
        .files
        .iter()
        .map(|n| n.id.strip_prefix("impl:").unwrap_or(&n.id))
        .collect();
    let (groups, degenerate) = partition(assembly, &paths, config.min_modularity);

    let mut allocator = IdAllocator::new();
    let mut out = Clustering {
        degenerate,
        ..Clustering::default()
    };

    let mut domain_members: Vec<(String, Vec<String>)> = Vec::new();
    let mut interface_systems: Vec<String> = Vec::new();

    for (name, origin, members) in groups {
        let member_paths: Vec<&str> =
            members.iter().filter_map(|i| paths.get(*i).copied()).collect();
        let system = system_node(&mut allocator, &name, origin, &member_paths);

        for path in &member_paths {
            out.contains.push(Edge::contains(&system.id, &ids::implementation_id(path)));
        }

        if domains::heuristic_domain(&name, &member_paths) == Some(domains::INTERFACE) {
            interface_systems.push(system.id.clone());
        }
        let domain = domains::assign_domain(&config.domain_labels, &name, &member_paths);
        match domain_members.iter_mut().find(|(label, _)| *label == domain) {
            Some((_, systems)) => systems.push(system.id.clone()),
            None => domain_members.push((domain, vec![system.id.clone()])),
        }
        out.systems.push(system);
    }

    if config.actor_stub && !interface_systems.is_empty() {
        let user = Node::new(
            ids::external_id(NodeKind::User),
            NodeKind::User.stub_name(),
            NodeKind::User,
            Level::System,
        );
        for target in &interface_systems {
            out.actor_edges
                .push(Edge::new(&user.id, target, EdgeType::DependsOn, 1));
        }
        out.actor = Some(user);
    }

    let mut external_members: Vec<String> = assembly.stubs.iter().map(|n| n.id.clone()).collect();
    if let Some(user) = &out.actor {
        external_members.push(user.id.clone());
    }
    if !external_members.is_empty() {
        domain_members.push((domains::EXTERNAL.to_string(), external_members));
    }

    for (label, members) in domain_members {
        let id = allocator.allocate(Level::Business, &label);
        let mut domain = Node::new(id, label, NodeKind::Domain, Level::Business);
        domain.annotate("cluster_size", members.len());
        for member in &members {
            out.contains.push(Edge::contains(&domain.id, member));
        }
        domain.members = members;
        out.business.push(domain);
    }

    let covered = out
        .systems
        .iter()
        .map(|s| s.members.len())
        .sum::<usize>();
    out.coverage = coverage(covered, paths.len());

    debug!(
        systems = out.systems.len(),
        domains = out.business.len(),
        coverage = out.coverage,
        "clustered implementation nodes"
    );
    out
}

#[allow(clippy::cast_precision_loss)]
fn coverage(covered: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    covered.min(total) as f64 / total as f64 * 100.0
}

type Groups = Vec<(String, Origin, Vec<usize>)>;

/// Runs modularity clustering and falls back to directories when the
/// partition is degenerate.
fn partition(
    assembly: &Assembly,
    paths: &[&str],
    min_modularity: f64,
) -> (Groups, Option<DegenerateReport>) {
    let n = paths.len();
    let index: BTreeMap<&str, usize> = assembly
        .files
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();

    let edges: Vec<(usize, usize, f64)> = assembly
        .raw
        .iter()
        .filter(|e| e.kind != RawKind::ExternalImport)
        .filter_map(|e| {
            let from = index.get(e.from.as_str())?;
            let to = index.get(e.to.as_str())?;
            Some((*from, *to, f64::from(e.weight)))
        })
        .collect();

    let result = modularity::greedy_modularity(n, &edges);
    let reason = if n < 2 {
        None
    } else if result.groups.len() == 1 {
        Some("single community")
    } else if result.groups.len() == n {
        Some("all singleton communities")
    } else if result.modularity < min_modularity {
        Some("modularity below threshold")
    } else {
        None
    };

    let Some(reason) = reason else {
        let groups = result
            .groups
            .into_iter()
            .map(|members| {
                let member_paths: Vec<&str> =
                    members.iter().filter_map(|i| paths.get(*i).copied()).collect();
                (directory::dominant_parent(&member_paths), Origin::Modularity, members)
            })
            .collect();
        return (groups, None);
    };

    let fallback: Groups = directory::fallback_groups(paths)
        .into_iter()
        .map(|(key, members)| (key, Origin::Directory, members))
        .collect();
    warn!(
        reason,
        communities = result.groups.len(),
        nodes = n,
        modularity = result.modularity,
        fallback_groups = fallback.len(),
        "degenerate clustering, grouping by directory"
    );
    let report = DegenerateReport {
        reason: reason.to_string(),
        communities: result.groups.len(),
        nodes: n,
        modularity: result.modularity,
        fallback_groups: fallback.len(),
    };
    (fallback, Some(report))
}

fn system_node(
    allocator: &mut IdAllocator,
    name: &str,
    origin: Origin,
    member_paths: &[&str],
) -> Node {
    let kind = if SERVICE_NAME.is_match(name) {
        NodeKind::Service
    } else if origin == Origin::Modularity {
        NodeKind::Cluster
    } else {
        NodeKind::Module
    };
    let mut node = Node::new(allocator.allocate(Level::System, name), name, kind, Level::System);
    node.members = member_paths.iter().map(|p| ids::implementation_id(p)).collect();
    node.annotate("cluster_size", member_paths.len());
    node.annotate("origin", origin.label());
    node
}
