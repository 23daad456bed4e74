// src/model/diagnostics.rs
//! Non-fatal conditions surfaced alongside a successful run.

use serde::{Deserialize, Serialize};

use super::Level;

/// Clustering produced a trivial partition and the directory fallback ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegenerateReport {
    pub reason: String,
    pub communities: usize,
    pub nodes: usize,
    pub modularity: f64,
    pub fallback_groups: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Import,
    Call,
}

/// An import or call target that matched nothing local or external.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnresolvedReference {
    pub from: String,
    pub target: String,
    pub kind: ReferenceKind,
}

/// A band grew wider than the configured sane bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOverflow {
    pub level: Level,
    pub width: f64,
    pub limit: f64,
    pub nodes: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub degenerate_partition: Option<DegenerateReport>,
    pub unresolved_references: usize,
    pub unresolved: Vec<UnresolvedReference>,
    pub layout_overflow: Vec<LayoutOverflow>,
    pub low_coverage: bool,
    pub excluded_files: usize,
    pub pruned_edges: usize,
    pub system_cycles: Vec<Vec<String>>,
    pub validation_issues: Vec<String>,
}

impl Diagnostics {
    /// True when nothing worth an operator's attention happened.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.degenerate_partition.is_none()
            && self.unresolved_references == 0
            && self.layout_overflow.is_empty()
            && !self.low_coverage
            && self.validation_issues.is_empty()
    }
}
