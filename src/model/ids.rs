// src/model/ids.rs
//! Deterministic id derivation. Ids depend only on level, cluster path and
//! entity name, never on iteration order of hashed collections.

use std::collections::BTreeSet;

use super::{EdgeType, Level, NodeKind};

/// Lowercase, `[a-z0-9_]` runs joined by `-`.
#[must_use]
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        out.push_str("unnamed");
    }
    out
}

#[must_use]
pub fn implementation_id(path: &str) -> String {
    format!("impl:{path}")
}

#[must_use]
pub fn external_id(kind: NodeKind) -> String {
    format!("external:{}", slug(kind.label()))
}

#[must_use]
pub fn edge_id(edge_type: EdgeType, from: &str, to: &str) -> String {
    format!("{}:{from}->{to}", edge_type.label())
}

/// Hands out `business:`/`system:` ids, suffixing `-2`, `-3`, ... on
/// collision in the order requests arrive.
#[derive(Debug, Default)]
pub struct IdAllocator {
    taken: BTreeSet<String>,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the id for a cluster or domain named `name` at `level`.
    pub fn allocate(&mut self, level: Level, name: &str) -> String {
        let prefix = match level {
            Level::Business => "business",
            Level::System => "system",
            Level::Implementation => "impl",
        };
        let base = format!("{prefix}:{}", slug(name));
        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Core Services"), "core-services");
        assert_eq!(slug("  data__layer!! "), "data__layer");
        assert_eq!(slug("***"), "unnamed");
    }

    #[test]
    fn test_allocator_suffixes_collisions_in_order() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(Level::System, "utils"), "system:utils");
        assert_eq!(ids.allocate(Level::System, "Utils"), "system:utils-2");
        assert_eq!(ids.allocate(Level::System, "utils"), "system:utils-3");
        assert_eq!(ids.allocate(Level::Business, "utils"), "business:utils");
    }

    #[test]
    fn test_edge_id() {
        assert_eq!(
            edge_id(EdgeType::DependsOn, "system:a", "system:b"),
            "depends_on:system:a->system:b"
        );
        assert_eq!(external_id(NodeKind::LlmService), "external:llm_service");
    }
}
