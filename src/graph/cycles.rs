// src/graph/cycles.rs
//! Cycle detection over directed id pairs (DFS, sorted starts).

use std::collections::{BTreeMap, BTreeSet};

/// Returns each cycle found as its node list, closed by repeating the entry
/// node (`a -> b -> a` is `[a, b, a]`).
pub fn detect_cycles<'a, I>(edges: I) -> Vec<Vec<String>>
where
    I: Iterator<Item = (&'a str, &'a str)>,
{
    let mut adjacency: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut nodes = BTreeSet::new();

    for (from, to) in edges {
        adjacency.entry(from).or_default().insert(to);
        nodes.insert(from);
        nodes.insert(to);
    }

    let mut state = DfsState::default();
    for node in nodes {
        if !state.visited.contains(node) {
            dfs(node, &adjacency, &mut state);
        }
    }
    state.cycles
}

#[derive(Default)]
struct DfsState<'a> {
    visited: BTreeSet<&'a str>,
    recursion_stack: BTreeSet<&'a str>,
    path_stack: Vec<&'a str>,
    cycles: Vec<Vec<String>>,
}

fn dfs<'a>(
    node: &'a str,
    adjacency: &BTreeMap<&'a str, BTreeSet<&'a str>>,
    state: &mut DfsState<'a>,
) {
    state.visited.insert(node);
    state.recursion_stack.insert(node);
    state.path_stack.push(node);

    if let Some(neighbors) = adjacency.get(node) {
        for &neighbor in neighbors {
            if !state.visited.contains(neighbor) {
                dfs(neighbor, adjacency, state);
            } else if state.recursion_stack.contains(neighbor) {
                record_cycle(neighbor, state);
            }
        }
    }

    state.recursion_stack.remove(node);
    state.path_stack.pop();
}

fn record_cycle(neighbor: &str, state: &mut DfsState<'_>) {
    if let Some(pos) = state.path_stack.iter().position(|x| *x == neighbor) {
        let mut cycle: Vec<String> = state
            .path_stack
            .iter()
            .skip(pos)
            .map(|s| (*s).to_string())
            .collect();
        cycle.push(neighbor.to_string());
        state.cycles.push(cycle);
    }
}
