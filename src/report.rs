// src/report.rs
//! Human-readable run summaries.

use colored::Colorize;

use crate::enrich::EnrichmentOutcome;
use crate::model::{Diagnostics, EdgeType, Graph, Level};

/// Prints the band, edge and diagnostic summary of a finished graph.
pub fn print_summary(graph: &Graph) {
    let meta = &graph.metadata;
    println!(
        "\n{} {} nodes | {} edges | coverage {}",
        "TIERGRAPH".cyan().bold(),
        graph.nodes.len(),
        graph.edges.len(),
        format_coverage(meta.coverage_percentage, meta.diagnostics.low_coverage),
    );

    for level in Level::ALL {
        let count = meta.level_counts.get(&level).copied().unwrap_or(0);
        let width = meta.layout_bands.get(&level).map_or(0.0, |b| b.width);
        println!("  {:<16} {:>5} nodes  {:>9.0} wide", level.label(), count, width);
    }
    for edge_type in EdgeType::ALL {
        let count = meta.edge_type_counts.get(&edge_type).copied().unwrap_or(0);
        println!("  {:<16} {:>5} edges", edge_type.label(), count);
    }

    print_diagnostics(&meta.diagnostics);
}

fn format_coverage(coverage: f64, low: bool) -> String {
    let text = format!("{coverage:.1}%");
    if low {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

fn print_diagnostics(d: &Diagnostics) {
    if d.is_quiet() {
        println!("{}", "  ✓ No diagnostics.".green());
        return;
    }

    if let Some(degenerate) = &d.degenerate_partition {
        println!(
            "\n{} {} ({} communities over {} files, Q = {:.3}); {} directory groups used",
            "▸".yellow(),
            "Degenerate partition".yellow().bold(),
            degenerate.communities,
            degenerate.nodes,
            degenerate.modularity,
            degenerate.fallback_groups,
        );
        println!("      {}", degenerate.reason.dimmed());
    }

    if d.unresolved_references > 0 {
        println!(
            "\n{} {} {}",
            "▸".yellow(),
            "Unresolved references:".yellow().bold(),
            d.unresolved_references
        );
        for r in &d.unresolved {
            println!("    {} → {}", r.from, r.target.red());
        }
        let hidden = d.unresolved_references.saturating_sub(d.unresolved.len());
        if hidden > 0 {
            println!("    {}", format!("... and {hidden} more").dimmed());
        }
    }

    for overflow in &d.layout_overflow {
        println!(
            "\n{} {} {} band is {:.0} wide (limit {:.0}, {} nodes)",
            "▸".yellow(),
            "Layout overflow:".yellow().bold(),
            overflow.level.label(),
            overflow.width,
            overflow.limit,
            overflow.nodes,
        );
    }

    if !d.system_cycles.is_empty() {
        println!("\n{} {}", "▸".yellow(), "System dependency cycles".yellow().bold());
        for cycle in &d.system_cycles {
            println!("    {}", cycle.join(" → "));
        }
    }

    if !d.validation_issues.is_empty() {
        println!("\n{} {}", "✗".red(), "Invariant violations".red().bold());
        for issue in &d.validation_issues {
            println!("    {issue}");
        }
    }
}

/// Prints the outcome of a determinism check.
pub fn print_check(identical: bool, issues: &[String]) {
    if identical {
        println!("{}", "  ✓ Two runs produced identical output.".green());
    } else {
        println!("{}", "  ✗ Two runs produced different output.".red().bold());
    }
    if issues.is_empty() {
        println!("{}", "  ✓ All graph invariants hold.".green());
    } else {
        println!("{} {} invariant violations", "  ✗".red(), issues.len());
    }
}

pub fn print_enrichment(outcome: &EnrichmentOutcome) {
    println!(
        "\n{} {} nodes enriched | {} rejected fields | {} ignored fields",
        "ENRICH".cyan().bold(),
        outcome.enriched_nodes.to_string().green(),
        format_count(outcome.rejected_fields),
        outcome.ignored_fields,
    );
}

fn format_count(n: usize) -> String {
    if n == 0 {
        n.to_string().green().to_string()
    } else {
        n.to_string().red().to_string()
    }
}
