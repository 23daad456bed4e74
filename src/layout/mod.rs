// src/layout/mod.rs
//! Deterministic band layout.
//!
//! Layout is a pure function of the graph's nodes and edges: metadata and
//! previous positions are never read, so re-running it reproduces the same
//! coordinates.

pub mod order;
pub mod place;

use tracing::{debug, warn};

use crate::config::{LayoutConfig, NodeSize};
use crate::model::{Graph, LayoutOverflow, Level};

/// Box size of nodes in a band.
#[must_use]
pub fn node_size(config: &LayoutConfig, level: Level) -> NodeSize {
    match level {
        Level::Business => config.business,
        Level::System => config.system,
        Level::Implementation => config.implementation,
    }
}

/// Assigns positions to every node and records band extents in the graph
/// metadata. Bands wider than `max_band_width` are returned as overflow.
pub fn layout(graph: &mut Graph, config: &LayoutConfig) -> Vec<LayoutOverflow> {
    let bands = order::band_order(graph);
    let placement = {
        let parents = graph.parents();
        place::place(&bands, &parents, config)
    };

    for node in &mut graph.nodes {
        node.position = placement.positions.get(&node.id).copied();
    }

    let mut overflow = Vec::new();
    for (level, band) in &placement.bands {
        let nodes = bands.get(level).map_or(0, Vec::len);
        if band.width > config.max_band_width {
            warn!(
                level = level.label(),
                width = band.width,
                limit = config.max_band_width,
                nodes,
                "band exceeds maximum width"
            );
            overflow.push(LayoutOverflow {
                level: *level,
                width: band.width,
                limit: config.max_band_width,
                nodes,
            });
        }
        debug!(level = level.label(), nodes, width = band.width, "placed band");
    }
    graph.metadata.layout_bands = placement.bands;
    overflow
}
