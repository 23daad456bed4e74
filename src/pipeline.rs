// src/pipeline.rs
//! Stage orchestration: Assemble → Cluster → Classify → Layout → Palette,
//! followed by validation.
//!
//! Each stage reads only what the previous one produced. A cancelled run
//! leaves nothing behind and must start again from the assembler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::graph::assemble::{self, Assembly};
use crate::graph::classify;
use crate::graph::cluster::{self, Clustering};
use crate::graph::cycles::detect_cycles;
use crate::graph::validate::validate;
use crate::inventory::Inventory;
use crate::layout;
use crate::model::{Diagnostics, EdgeType, Graph, Level, Node};
use crate::palette;

/// Shared cancellation flag, checked before every stage.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Assemble,
    Cluster,
    Classify,
    Layout,
    Palette,
}

impl Stage {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Assemble => "assemble",
            Self::Cluster => "cluster",
            Self::Classify => "classify",
            Self::Layout => "layout",
            Self::Palette => "palette",
        }
    }
}

/// Runs the whole pipeline over one inventory.
pub struct Engine {
    config: EngineConfig,
    cancel: CancelToken,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Builds the three-tier graph.
    ///
    /// # Errors
    /// Returns `EngineError::Cancelled` when the token is set before a stage.
    pub fn run(&self, inventory: Inventory) -> Result<Graph> {
        self.run_with_progress(inventory, &|_| {})
    }

    /// Like [`Engine::run`], calling `on_stage` as each stage is reached and
    /// before its cancellation check.
    ///
    /// # Errors
    /// Returns `EngineError::Cancelled` when the token is set before a stage.
    pub fn run_with_progress<F>(&self, inventory: Inventory, on_stage: &F) -> Result<Graph>
    where
        F: Fn(Stage),
    {
        let checkpoint = |stage: Stage| {
            on_stage(stage);
            self.checkpoint(stage)
        };
        checkpoint(Stage::Assemble)?;
        let input_digest = inventory.digest();
        let (inventory, excluded) = inventory.exclude(&self.config.inventory.exclude_segments);
        info!(files = inventory.len(), excluded, "assembling implementation band");
        let assembly = assemble::assemble(&inventory, &self.config.assemble);

        let mut diagnostics = Diagnostics {
            excluded_files: excluded,
            unresolved_references: assembly.unresolved.len(),
            unresolved: assembly
                .unresolved
                .iter()
                .take(self.config.assemble.max_unresolved_listed)
                .cloned()
                .collect(),
            ..Diagnostics::default()
        };
        if diagnostics.unresolved_references > 0 {
            warn!(count = diagnostics.unresolved_references, "unresolved references");
        }

        checkpoint(Stage::Cluster)?;
        info!(nodes = assembly.files.len(), "clustering");
        let clustering = cluster::cluster(&assembly, &self.config.cluster);
        diagnostics.degenerate_partition.clone_from(&clustering.degenerate);
        let coverage = clustering.coverage;
        let Assembly { files, stubs, raw, .. } = assembly;
        let mut graph = compose(files, stubs, clustering);

        checkpoint(Stage::Classify)?;
        info!(raw_edges = raw.len(), "classifying edges");
        let report = classify::classify(&mut graph, &raw, &self.config.rollup);
        diagnostics.pruned_edges = report.pruned;

        checkpoint(Stage::Layout)?;
        info!(nodes = graph.nodes.len(), "laying out bands");
        diagnostics.layout_overflow = layout::layout(&mut graph, &self.config.layout);

        checkpoint(Stage::Palette)?;
        palette::paint(&mut graph, &self.config.palette);

        let validation = validate(&graph, &self.config.layout);
        for issue in &validation.violations {
            warn!(issue = %issue, "graph invariant violated");
        }
        diagnostics.validation_issues = validation.messages();
        diagnostics.system_cycles = system_cycles(&graph);
        if !diagnostics.system_cycles.is_empty() {
            debug!(cycles = diagnostics.system_cycles.len(), "system dependency cycles");
        }

        diagnostics.low_coverage = coverage < self.config.cluster.min_coverage;
        if diagnostics.low_coverage {
            warn!(
                coverage,
                minimum = self.config.cluster.min_coverage,
                "clustering coverage below threshold"
            );
        }

        graph.metadata.coverage_percentage = coverage;
        graph.metadata.input_digest = input_digest;
        graph.metadata.engine_version = env!("CARGO_PKG_VERSION").to_string();
        graph.metadata.diagnostics = diagnostics;
        graph.refresh_counts();

        info!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            coverage,
            "graph complete"
        );
        Ok(graph)
    }

    fn checkpoint(&self, stage: Stage) -> Result<()> {
        if self.cancel.is_cancelled() {
            warn!(stage = stage.label(), "run cancelled");
            return Err(EngineError::Cancelled {
                stage: stage.label(),
            });
        }
        debug!(stage = stage.label(), "entering stage");
        Ok(())
    }
}

/// Node order: domains, clusters, stubs, files.
fn compose(files: Vec<Node>, stubs: Vec<Node>, c: Clustering) -> Graph {
    let mut graph = Graph::default();
    graph.nodes.extend(c.business);
    graph.nodes.extend(c.systems);
    graph.nodes.extend(stubs);
    graph.nodes.extend(c.actor);
    graph.nodes.extend(files);
    graph.edges.extend(c.contains);
    graph.edges.extend(c.actor_edges);
    graph
}

fn system_cycles(graph: &Graph) -> Vec<Vec<String>> {
    let index = graph.index();
    let is_system = |id: &str| index.get(id).is_some_and(|n| n.level == Level::System);
    detect_cycles(
        graph
            .edges_of(EdgeType::DependsOn)
            .filter(|e| is_system(&e.from) && is_system(&e.to))
            .map(|e| (e.from.as_str(), e.to.as_str())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::FileRecord;

    fn inventory() -> Inventory {
        let files = vec![
            FileRecord::new("app/api/x.py").with_imports(&["lib.shared"]),
            FileRecord::new("app/web/y.py").with_imports(&["lib.shared", "openai"]),
            FileRecord::new("lib/shared.py").with_functions(&["helper"]),
        ];
        match Inventory::new(files) {
            Ok(inv) => inv,
            Err(e) => panic!("fixture inventory rejected: {e}"),
        }
    }

    #[test]
    fn test_cancelled_before_first_stage() {
        let token = CancelToken::new();
        token.cancel();
        let engine = Engine::new(EngineConfig::default()).with_cancel(token);
        let err = engine.run(inventory()).err();
        assert!(matches!(err, Some(EngineError::Cancelled { stage: "assemble" })));
    }

    #[test]
    fn test_cancelled_between_stages() {
        for stop in [Stage::Cluster, Stage::Classify, Stage::Layout, Stage::Palette] {
            let token = CancelToken::new();
            let engine = Engine::new(EngineConfig::default()).with_cancel(token.clone());
            let seen = std::cell::RefCell::new(Vec::new());
            let result = engine.run_with_progress(inventory(), &|stage| {
                seen.borrow_mut().push(stage);
                if stage == stop {
                    token.cancel();
                }
            });
            match result {
                Err(EngineError::Cancelled { stage }) => assert_eq!(stage, stop.label()),
                other => panic!("expected cancellation at {}, got {other:?}", stop.label()),
            }
            assert_eq!(seen.borrow().last(), Some(&stop));
        }
    }

    #[test]
    fn test_progress_reports_every_stage_in_order() {
        let seen = std::cell::RefCell::new(Vec::new());
        let engine = Engine::new(EngineConfig::default());
        let result = engine.run_with_progress(inventory(), &|stage| seen.borrow_mut().push(stage));
        assert!(result.is_ok());
        assert_eq!(
            seen.into_inner(),
            vec![
                Stage::Assemble,
                Stage::Cluster,
                Stage::Classify,
                Stage::Layout,
                Stage::Palette
            ]
        );
    }

    #[test]
    fn test_run_fills_metadata() {
        let engine = Engine::new(EngineConfig::default());
        let graph = match engine.run(inventory()) {
            Ok(g) => g,
            Err(e) => panic!("run failed: {e}"),
        };
        assert!(graph.metadata.diagnostics.validation_issues.is_empty());
        assert_eq!(graph.metadata.input_digest.len(), 64);
        assert_eq!(graph.metadata.level_counts.get(&Level::Implementation), Some(&3));
        assert!(graph.nodes.iter().all(|n| n.position.is_some() && n.color.is_some()));
        assert!((graph.metadata.coverage_percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_excluded_files_are_counted() {
        let mut files = inventory().files().to_vec();
        files.push(FileRecord::new("tests/test_x.py"));
        let inv = match Inventory::new(files) {
            Ok(inv) => inv,
            Err(e) => panic!("{e}"),
        };
        let graph = match Engine::new(EngineConfig::default()).run(inv) {
            Ok(g) => g,
            Err(e) => panic!("{e}"),
        };
        assert_eq!(graph.metadata.diagnostics.excluded_files, 1);
        assert!(graph.node("impl:tests/test_x.py").is_none());
    }
}
