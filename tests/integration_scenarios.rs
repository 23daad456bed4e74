// tests/integration_scenarios.rs
//! End-to-end runs of the pipeline over small synthetic inventories.

use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use tiergraph_core::config::EngineConfig;
use tiergraph_core::error::EngineError;
use tiergraph_core::inventory::{FileRecord, Inventory};
use tiergraph_core::layout;
use tiergraph_core::model::{EdgeType, Graph, Level};
use tiergraph_core::pipeline::{CancelToken, Engine, Stage};

// --- Helpers ---

fn build(files: Vec<FileRecord>) -> Result<Graph> {
    let inventory = Inventory::new(files)?;
    Ok(Engine::new(EngineConfig::default()).run(inventory)?)
}

fn linear_chain() -> Vec<FileRecord> {
    vec![
        FileRecord::new("pkg/a.py").with_imports(&["pkg.b"]),
        FileRecord::new("pkg/b.py").with_imports(&["pkg.c"]),
        FileRecord::new("pkg/c.py").with_imports(&["pkg.d"]),
        FileRecord::new("pkg/d.py"),
    ]
}

fn shared_import() -> Vec<FileRecord> {
    vec![
        FileRecord::new("app/api/x.py").with_imports(&["lib.shared"]),
        FileRecord::new("app/web/y.py").with_imports(&["lib.shared"]),
        FileRecord::new("lib/shared.py").with_functions(&["helper"]),
    ]
}

/// Three packages with dense internal imports and a few cross links.
fn packages() -> Vec<FileRecord> {
    let mut files = Vec::new();
    for pkg in ["billing", "auth", "reports"] {
        for i in 0..5 {
            let imports: Vec<String> = (0..5)
                .filter(|j| *j != i)
                .map(|j| format!("{pkg}.m{j}"))
                .collect();
            let refs: Vec<&str> = imports.iter().map(String::as_str).collect();
            let mut record = FileRecord::new(format!("{pkg}/m{i}.py")).with_imports(&refs);
            record.functions = vec![format!("{pkg}_fn{i}")];
            files.push(record);
        }
    }
    files.push(
        FileRecord::new("reports/summary.py")
            .with_imports(&["billing.m0", "auth.m1", "requests", "os"])
            .with_calls(&["billing_fn2", "print"]),
    );
    files
}

fn parents(graph: &Graph) -> BTreeMap<&str, Vec<&str>> {
    let mut out: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for edge in graph.edges_of(EdgeType::Contains) {
        out.entry(edge.to.as_str()).or_default().push(edge.from.as_str());
    }
    out
}

// --- Scenarios ---

#[test]
fn test_linear_chain_falls_back_to_one_directory_cluster() -> Result<()> {
    let graph = build(linear_chain())?;

    assert_eq!(graph.nodes_at(Level::Business).count(), 1);
    assert_eq!(graph.nodes_at(Level::System).count(), 1);
    assert_eq!(graph.nodes_at(Level::Implementation).count(), 4);

    let degenerate = graph.metadata.diagnostics.degenerate_partition.as_ref();
    assert!(degenerate.is_some(), "directory fallback should be reported");

    let index = graph.index();
    let system_edges = graph
        .edges_of(EdgeType::DependsOn)
        .filter(|e| index.get(e.from.as_str()).is_some_and(|n| n.level == Level::System))
        .count();
    assert_eq!(system_edges, 0);
    assert!(graph.edges.iter().all(|e| e.from != e.to));
    assert!(graph.metadata.diagnostics.validation_issues.is_empty());
    Ok(())
}

#[test]
fn test_shared_import_rolls_up_between_systems() -> Result<()> {
    let graph = build(shared_import())?;

    let systems: BTreeSet<&str> = graph
        .nodes_at(Level::System)
        .filter(|n| !n.external)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(systems, BTreeSet::from(["system:app", "system:lib"]));

    let rolled = graph
        .edges
        .iter()
        .find(|e| e.id == "depends_on:system:app->system:lib");
    assert!(rolled.is_some_and(|e| e.weight >= 2), "{:#?}", graph.edges);

    let index = graph.index();
    let bypass = graph.edges.iter().any(|e| {
        let from = index.get(e.from.as_str()).map(|n| n.level);
        let to = index.get(e.to.as_str()).map(|n| n.level);
        matches!(
            (from, to),
            (Some(Level::Business), Some(Level::Implementation))
                | (Some(Level::Implementation), Some(Level::Business))
        )
    });
    assert!(!bypass);
    Ok(())
}

#[test]
fn test_output_is_byte_identical_across_runs_and_input_order() -> Result<()> {
    let first = build(packages())?.to_json(true)?;
    let second = build(packages())?.to_json(true)?;
    let mut reversed = packages();
    reversed.reverse();
    let third = build(reversed)?.to_json(true)?;

    assert_eq!(first, second);
    assert_eq!(first, third);
    Ok(())
}

#[test]
fn test_structural_invariants_hold() -> Result<()> {
    let graph = build(packages())?;
    let levels: BTreeMap<&str, Level> =
        graph.nodes.iter().map(|n| (n.id.as_str(), n.level)).collect();
    let parents = parents(&graph);

    for node in &graph.nodes {
        let count = parents.get(node.id.as_str()).map_or(0, Vec::len);
        let expected = usize::from(node.level != Level::Business);
        assert_eq!(count, expected, "{} has {count} parents", node.id);
    }
    for edge in graph.edges_of(EdgeType::Contains) {
        let from = levels.get(edge.from.as_str()).copied();
        let to = levels.get(edge.to.as_str()).copied();
        assert_eq!(to.and_then(Level::parent), from, "{} skips a level", edge.id);
    }

    let coverage = graph.metadata.coverage_percentage;
    assert!((0.0..=100.0).contains(&coverage));
    assert!(graph.metadata.diagnostics.validation_issues.is_empty());

    let externals = &graph.metadata.external_kinds;
    assert!(externals.values().flatten().any(|id| id == "external:external_api"));
    Ok(())
}

#[test]
fn test_no_overlapping_boxes_within_a_band() -> Result<()> {
    let config = EngineConfig::default();
    let graph = build(packages())?;

    for level in Level::ALL {
        let width = layout::node_size(&config.layout, level).width;
        let mut xs: Vec<f64> = graph
            .nodes_at(level)
            .filter_map(|n| n.position.map(|p| p.x))
            .collect();
        xs.sort_by(f64::total_cmp);
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] >= width - 1e-6, "{level:?} overlap: {pair:?}");
        }
    }
    Ok(())
}

#[test]
fn test_relayout_is_idempotent() -> Result<()> {
    let mut graph = build(packages())?;
    let before: Vec<_> = graph.nodes.iter().map(|n| n.position).collect();

    layout::layout(&mut graph, &EngineConfig::default().layout);
    let after: Vec<_> = graph.nodes.iter().map(|n| n.position).collect();

    assert_eq!(before, after);
    Ok(())
}

#[test]
fn test_cancel_through_shared_token() -> Result<()> {
    let token = CancelToken::new();
    let engine = Engine::new(EngineConfig::default()).with_cancel(token.clone());
    token.clone().cancel();

    let result = engine.run(Inventory::new(shared_import())?);
    assert!(matches!(result, Err(EngineError::Cancelled { .. })));
    Ok(())
}

#[test]
fn test_cancel_between_stages_stops_at_next_checkpoint() -> Result<()> {
    let token = CancelToken::new();
    let engine = Engine::new(EngineConfig::default()).with_cancel(token.clone());

    let result = engine.run_with_progress(Inventory::new(packages())?, &|stage| {
        if stage == Stage::Classify {
            token.cancel();
        }
    });
    assert!(matches!(result, Err(EngineError::Cancelled { stage: "classify" })));
    Ok(())
}

#[test]
fn test_separate_importers_give_one_edge_per_directory() -> Result<()> {
    let graph = build(vec![
        FileRecord::new("a/x.py").with_imports(&["shared.s"]),
        FileRecord::new("b/y.py").with_imports(&["shared.s"]),
        FileRecord::new("shared/s.py"),
    ])?;

    let systems: BTreeSet<&str> = graph.nodes_at(Level::System).map(|n| n.id.as_str()).collect();
    assert_eq!(
        systems,
        BTreeSet::from(["system:a", "system:b", "system:shared"])
    );
    for from in ["system:a", "system:b"] {
        let id = format!("depends_on:{from}->system:shared");
        let edge = graph.edges.iter().find(|e| e.id == id);
        assert_eq!(edge.map(|e| e.weight), Some(1), "{id}");
    }
    Ok(())
}
