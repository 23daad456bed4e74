// src/layout/place.rs
//! One-dimensional placement inside bands.
//!
//! The Implementation band is packed left to right. Each upper band snaps a
//! node to the mean of its children's centers, pushed right when it would
//! overlap its left neighbour.

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::model::{BandInfo, Level, Position};

use super::node_size;
use super::order::BandOrder;

/// Center coordinates per node id plus per-band extents.
#[derive(Debug, Default)]
pub struct Placement {
    pub positions: BTreeMap<String, Position>,
    pub bands: BTreeMap<Level, BandInfo>,
}

/// Places every band. `parents` maps child id → parent id.
#[must_use]
pub fn place(
    order: &BandOrder,
    parents: &BTreeMap<&str, &str>,
    config: &LayoutConfig,
) -> Placement {
    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (child, parent) in parents {
        children.entry(*parent).or_default().push(*child);
    }

    let mut centers: BTreeMap<String, f64> = BTreeMap::new();
    let mut spans: BTreeMap<Level, (f64, f64)> = BTreeMap::new();

    for level in Level::ALL.iter().rev() {
        let ids = order.get(level).map(Vec::as_slice).unwrap_or_default();
        let half = node_size(config, *level).width / 2.0;
        let mut right: Option<f64> = None;
        let mut prev_parent: Option<&str> = None;

        for id in ids {
            let parent = parents.get(id.as_str()).copied();
            let left = match right {
                None => config.origin_x,
                Some(r) if parent == prev_parent => r + config.margin,
                Some(r) => r + config.margin + config.group_gap,
            };
            let desired = children
                .get(id.as_str())
                .and_then(|kids| mean(kids.iter().filter_map(|k| centers.get(*k).copied())));
            let center = desired.map_or(left + half, |d| d.max(left + half));

            centers.insert(id.clone(), center);
            right = Some(center + half);
            prev_parent = parent;
        }

        if let (Some(first), Some(r)) = (ids.first().and_then(|id| centers.get(id)), right) {
            spans.insert(*level, (first - half, r));
        }
    }

    let mut bands = BTreeMap::new();
    let mut top = config.origin_y;
    let mut positions = BTreeMap::new();
    for level in Level::ALL {
        let height = node_size(config, level).height;
        let center_y = top + height / 2.0;
        let (left, right) = spans
            .get(&level)
            .copied()
            .unwrap_or((config.origin_x, config.origin_x));
        bands.insert(
            level,
            BandInfo {
                top,
                center_y,
                height,
                left,
                right,
                width: right - left,
            },
        );
        for id in order.get(&level).into_iter().flatten() {
            if let Some(x) = centers.get(id) {
                positions.insert(id.clone(), Position { x: *x, y: center_y });
            }
        }
        top += height + config.band_gap;
    }

    Placement { positions, bands }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}
