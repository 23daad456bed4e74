// src/graph/coupling.rs
//! Afferent and efferent degree per node.

use std::collections::BTreeMap;

/// Inbound and outbound edge counts for one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Degree {
    afferent: usize,
    efferent: usize,
}

impl Degree {
    #[must_use]
    pub fn afferent(&self) -> usize {
        self.afferent
    }

    #[must_use]
    pub fn efferent(&self) -> usize {
        self.efferent
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.afferent + self.efferent
    }
}

/// Computes degree for every node touched by `edges`.
pub fn compute_degree<'a, I>(edges: I) -> BTreeMap<&'a str, Degree>
where
    I: Iterator<Item = (&'a str, &'a str)>,
{
    let mut degrees: BTreeMap<&str, Degree> = BTreeMap::new();
    for (from, to) in edges {
        degrees.entry(from).or_default().efferent += 1;
        degrees.entry(to).or_default().afferent += 1;
    }
    degrees
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_degree() {
        let edges = [
            ("a", "hub"),
            ("b", "hub"),
            ("c", "hub"),
            ("hub", "types"),
        ];
        let degrees = compute_degree(edges.iter().copied());

        let hub = degrees.get("hub").copied().unwrap_or_default();
        assert_eq!(hub.afferent(), 3);
        assert_eq!(hub.efferent(), 1);
        assert_eq!(hub.total(), 4);

        let a = degrees.get("a").copied().unwrap_or_default();
        assert_eq!(a.afferent(), 0);
        assert_eq!(a.efferent(), 1);
        assert!(degrees.get("missing").is_none());
    }
}
