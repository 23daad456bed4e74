// src/cli/handlers.rs
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::enrich::{apply_enrichment, JsonFileEnricher};
use crate::exit::TierGraphExit;
use crate::inventory::Inventory;
use crate::model::{Graph, Level};
use crate::pipeline::Engine;
use crate::report;

#[derive(Debug, Clone)]
pub struct BuildArgs {
    pub config: Option<PathBuf>,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub level: Option<Level>,
    pub compact: bool,
}

fn load_inputs(config: Option<&Path>, input: &Path) -> Result<(EngineConfig, Inventory)> {
    let config = EngineConfig::load(config).context("loading configuration")?;
    let inventory = Inventory::load(input)
        .with_context(|| format!("loading inventory from {}", input.display()))?;
    Ok((config, inventory))
}

/// Writes `text` to `output`, or to stdout when no path is given.
fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text).with_context(|| format!("writing {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}

/// Handles the build command.
///
/// # Errors
/// Returns error if loading, building or writing the graph fails.
pub fn handle_build(args: &BuildArgs) -> Result<TierGraphExit> {
    let (config, inventory) = load_inputs(args.config.as_deref(), &args.input)?;
    let graph = Engine::new(config).run(inventory)?;

    let artifact = match args.level {
        Some(level) => graph.view(level),
        None => graph,
    };
    let json = artifact.to_json(!args.compact)?;
    emit(&json, args.output.as_deref())?;

    // Stdout carries the artifact when no output file is given.
    if args.output.is_some() {
        report::print_summary(&artifact);
    }
    Ok(TierGraphExit::Success)
}

/// Handles the check command: two independent runs must serialize to the
/// same bytes and the graph must satisfy every structural invariant.
///
/// # Errors
/// Returns error if loading or building fails.
pub fn handle_check(config: Option<&Path>, input: &Path) -> Result<TierGraphExit> {
    let (config, inventory) = load_inputs(config, input)?;
    let engine = Engine::new(config);

    let first = engine.run(inventory.clone())?;
    let second = engine.run(inventory)?;
    let identical = first.to_json(false)? == second.to_json(false)?;

    report::print_summary(&first);
    let issues = &first.metadata.diagnostics.validation_issues;
    report::print_check(identical, issues);

    if identical && issues.is_empty() {
        Ok(TierGraphExit::Success)
    } else {
        Ok(TierGraphExit::CheckFailed)
    }
}

/// Handles the enrich command.
///
/// # Errors
/// Returns error if the graph or responses cannot be read or the result
/// cannot be written.
pub fn handle_enrich(
    graph_path: &Path,
    responses: &Path,
    output: Option<&Path>,
) -> Result<TierGraphExit> {
    let text = fs::read_to_string(graph_path)
        .with_context(|| format!("reading graph {}", graph_path.display()))?;
    let mut graph: Graph = serde_json::from_str(&text)
        .with_context(|| format!("parsing graph {}", graph_path.display()))?;
    let enricher = JsonFileEnricher::load(responses)
        .with_context(|| format!("loading responses {}", responses.display()))?;

    let outcome = apply_enrichment(&mut graph, &enricher);
    emit(&graph.to_json(true)?, output)?;
    if output.is_some() {
        report::print_enrichment(&outcome);
    }
    Ok(TierGraphExit::Success)
}
