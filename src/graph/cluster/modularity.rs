// src/graph/cluster/modularity.rs
//! Greedy modularity agglomeration (Clauset, Newman, Moore).
//!
//! Works on an undirected weighted graph over `0..n`. Starting from
//! singletons, the pair of adjacent communities with the largest modularity
//! gain is merged until no merge improves modularity. Pairs are scanned in
//! index order and a merge replaces the current best only on a strictly larger
//! gain, so ties go to the lowest indices and the result is reproducible.

use std::collections::BTreeMap;

use super::union_find::UnionFind;

const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Member indices per community, ordered by smallest member.
    pub groups: Vec<Vec<usize>>,
    pub modularity: f64,
}

/// Runs greedy agglomeration. `edges` are `(a, b, weight)`; parallel and
/// reversed pairs are summed, self-loops ignored.
#[must_use]
pub fn greedy_modularity(n: usize, edges: &[(usize, usize, f64)]) -> Partition {
    let mut uf = UnionFind::new(n);
    let mut weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for &(a, b, w) in edges {
        if a == b || a >= n || b >= n || w <= 0.0 {
            continue;
        }
        *weights.entry((a.min(b), a.max(b))).or_default() += w;
    }
    let total: f64 = weights.values().sum();
    if total <= 0.0 {
        return Partition {
            groups: uf.groups(),
            modularity: 0.0,
        };
    }

    // e[i][j]: fraction of edge ends joining communities i and j (each side).
    // a[i]: fraction of edge ends attached to community i.
    let two_m = 2.0 * total;
    let mut e: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
    let mut a = vec![0.0; n];
    for (&(i, j), &w) in &weights {
        let frac = w / two_m;
        *e[i].entry(j).or_default() += frac;
        *e[j].entry(i).or_default() += frac;
        a[i] += frac;
        a[j] += frac;
    }
    let mut q: f64 = -a.iter().map(|x| x * x).sum::<f64>();

    while let Some((i, j, gain)) = best_merge(&e, &a) {
        merge(&mut e, &mut a, i, j);
        uf.union(i, j);
        q += gain;
    }

    Partition {
        groups: uf.groups(),
        modularity: q,
    }
}

/// Modularity of an arbitrary partition of the same graph.
#[must_use]
pub fn modularity(n: usize, edges: &[(usize, usize, f64)], groups: &[Vec<usize>]) -> f64 {
    let mut community = vec![usize::MAX; n];
    for (c, members) in groups.iter().enumerate() {
        for &m in members {
            if let Some(slot) = community.get_mut(m) {
                *slot = c;
            }
        }
    }
    let mut total = 0.0;
    let mut inner = vec![0.0; groups.len()];
    let mut ends = vec![0.0; groups.len()];
    for &(x, y, w) in edges {
        if x == y || w <= 0.0 {
            continue;
        }
        let (Some(&cx), Some(&cy)) = (community.get(x), community.get(y)) else {
            continue;
        };
        total += w;
        if let Some(v) = ends.get_mut(cx) {
            *v += w;
        }
        if let Some(v) = ends.get_mut(cy) {
            *v += w;
        }
        if cx == cy {
            if let Some(v) = inner.get_mut(cx) {
                *v += w;
            }
        }
    }
    if total <= 0.0 {
        return 0.0;
    }
    inner
        .iter()
        .zip(&ends)
        .map(|(l, d)| l / total - (d / (2.0 * total)).powi(2))
        .sum()
}

#[allow(clippy::indexing_slicing)]
fn best_merge(e: &[BTreeMap<usize, f64>], a: &[f64]) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (i, row) in e.iter().enumerate() {
        for (&j, &eij) in row.range(i + 1..) {
            let gain = 2.0 * (eij - a[i] * a[j]);
            let threshold = best.map_or(EPSILON, |(_, _, g)| g + EPSILON);
            if gain > threshold {
                best = Some((i, j, gain));
            }
        }
    }
    best
}

/// Folds community `j` into `i` (`i < j`).
#[allow(clippy::indexing_slicing)]
fn merge(e: &mut [BTreeMap<usize, f64>], a: &mut [f64], i: usize, j: usize) {
    let row_j = std::mem::take(&mut e[j]);
    for (k, w) in row_j {
        e[k].remove(&j);
        if k == i {
            continue;
        }
        *e[i].entry(k).or_default() += w;
        *e[k].entry(i).or_default() += w;
    }
    e[i].remove(&j);
    a[i] += a[j];
    a[j] = 0.0;
}
