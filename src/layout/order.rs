// src/layout/order.rs
//! Stable left-to-right ordering within each band.
//!
//! Nodes are grouped under their parent, groups follow the parent band's
//! order, and siblings are arranged center-out by descending degree with
//! name then id breaking ties.

use std::collections::{BTreeMap, VecDeque};

use crate::graph::coupling::{compute_degree, Degree};
use crate::model::{Graph, Level};

/// Ordered node ids per level.
pub type BandOrder = BTreeMap<Level, Vec<String>>;

/// Computes the order of every band, top-down.
#[must_use]
pub fn band_order(graph: &Graph) -> BandOrder {
    let parents = graph.parents();
    let degrees: BTreeMap<&str, Degree> =
        compute_degree(graph.edges.iter().map(|e| (e.from.as_str(), e.to.as_str())));

    let mut orders = BandOrder::new();
    let mut parent_rank: BTreeMap<&str, usize> = BTreeMap::new();

    for level in Level::ALL {
        let mut groups: BTreeMap<usize, Vec<(usize, &str, &str)>> = BTreeMap::new();
        for node in graph.nodes_at(level) {
            let rank = match parents.get(node.id.as_str()) {
                Some(p) => parent_rank.get(p).copied().unwrap_or(usize::MAX),
                None if level == Level::Business => 0,
                None => usize::MAX,
            };
            let degree = degrees.get(node.id.as_str()).map_or(0, Degree::total);
            groups
                .entry(rank)
                .or_default()
                .push((degree, node.name.as_str(), node.id.as_str()));
        }

        let mut order: Vec<&str> = Vec::new();
        for (_, mut siblings) in groups {
            siblings.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(b.1)).then(a.2.cmp(b.2)));
            order.extend(center_out(siblings).into_iter().map(|(_, _, id)| id));
        }

        parent_rank = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        orders.insert(level, order.into_iter().map(str::to_string).collect());
    }
    orders
}

/// Places the first item in the middle and alternates outward:
/// `[a, b, c, d]` becomes `[d, b, a, c]`.
#[must_use]
pub fn center_out<T>(sorted: Vec<T>) -> Vec<T> {
    let mut deque = VecDeque::with_capacity(sorted.len());
    for (i, item) in sorted.into_iter().enumerate() {
        if i % 2 == 0 {
            deque.push_back(item);
        } else {
            deque.push_front(item);
        }
    }
    deque.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, EdgeType, Node, NodeKind};

    #[test]
    fn test_center_out() {
        assert_eq!(center_out(vec![1, 2, 3, 4, 5]), vec![4, 2, 1, 3, 5]);
        assert_eq!(center_out(vec!['a', 'b', 'c', 'd']), vec!['d', 'b', 'a', 'c']);
        assert!(center_out(Vec::<u8>::new()).is_empty());
    }

    #[test]
    fn test_children_follow_parent_order_and_degree() {
        let node = |id: &str, level, kind| Node::new(id.into(), id, kind, level);
        let graph = Graph {
            nodes: vec![
                node("business:b", Level::Business, NodeKind::Domain),
                node("system:s1", Level::System, NodeKind::Module),
                node("system:s2", Level::System, NodeKind::Module),
                node("impl:hub", Level::Implementation, NodeKind::File),
                node("impl:leaf_a", Level::Implementation, NodeKind::File),
                node("impl:leaf_b", Level::Implementation, NodeKind::File),
                node("impl:other", Level::Implementation, NodeKind::File),
            ],
            edges: vec![
                Edge::contains("business:b", "system:s1"),
                Edge::contains("business:b", "system:s2"),
                Edge::contains("system:s1", "impl:other"),
                Edge::contains("system:s2", "impl:hub"),
                Edge::contains("system:s2", "impl:leaf_a"),
                Edge::contains("system:s2", "impl:leaf_b"),
                Edge::new("impl:leaf_a", "impl:hub", EdgeType::DependsOn, 1),
                Edge::new("impl:leaf_b", "impl:hub", EdgeType::DependsOn, 1),
                Edge::new("impl:other", "impl:hub", EdgeType::Calls, 1),
            ],
            ..Graph::default()
        };
        let orders = band_order(&graph);
        let system = orders.get(&Level::System).cloned().unwrap_or_default();
        // s2 has the higher degree and takes the center slot.
        assert_eq!(system, vec!["system:s1", "system:s2"]);
        let implementation = orders.get(&Level::Implementation).cloned().unwrap_or_default();
        assert_eq!(
            implementation,
            vec!["impl:other", "impl:leaf_a", "impl:hub", "impl:leaf_b"]
        );
    }
}
