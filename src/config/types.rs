use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ingest filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Directory names whose files are dropped before assembly.
    #[serde(default = "default_exclude_segments")]
    pub exclude_segments: Vec<String>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self { exclude_segments: default_exclude_segments() }
    }
}

fn default_exclude_segments() -> Vec<String> {
    ["tests", "test", "docs", "examples", "example", "static", "assets"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

/// Raw edge construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembleConfig {
    /// Import strings / call sites kept on each raw edge.
    #[serde(default = "default_max_evidence")]
    pub max_evidence: usize,
    /// Unresolved references listed individually in diagnostics.
    #[serde(default = "default_max_unresolved_listed")]
    pub max_unresolved_listed: usize,
}

impl Default for AssembleConfig {
    fn default() -> Self {
        Self {
            max_evidence: default_max_evidence(),
            max_unresolved_listed: default_max_unresolved_listed(),
        }
    }
}

const fn default_max_evidence() -> usize { 5 }
const fn default_max_unresolved_listed() -> usize { 50 }

/// System and Business clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Partitions scoring below this modularity fall back to directories.
    #[serde(default = "default_min_modularity")]
    pub min_modularity: f64,
    /// Coverage (0-100) below which the run is flagged.
    #[serde(default = "default_min_coverage")]
    pub min_coverage: f64,
    /// Adds a `User` stub in front of interface-facing clusters.
    #[serde(default = "default_true")]
    pub actor_stub: bool,
    /// Path prefix -> Business domain label. Wins over directory heuristics.
    #[serde(default)]
    pub domain_labels: BTreeMap<String, String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_modularity: default_min_modularity(),
            min_coverage: default_min_coverage(),
            actor_stub: default_true(),
            domain_labels: BTreeMap::new(),
        }
    }
}

const fn default_min_modularity() -> f64 { 0.3 }
const fn default_min_coverage() -> f64 { 95.0 }
const fn default_true() -> bool { true }

/// System-level rollups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupConfig {
    /// Representative raw edges kept on each rolled-up edge.
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self { max_examples: default_max_examples() }
    }
}

const fn default_max_examples() -> usize { 3 }

/// Node box size for one band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NodeSize {
    pub width: f64,
    pub height: f64,
}

/// Band geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_business_size")]
    pub business: NodeSize,
    #[serde(default = "default_system_size")]
    pub system: NodeSize,
    #[serde(default = "default_implementation_size")]
    pub implementation: NodeSize,
    /// Horizontal gap between neighbours in a band.
    #[serde(default = "default_margin")]
    pub margin: f64,
    /// Extra horizontal gap where the parent changes.
    #[serde(default = "default_group_gap")]
    pub group_gap: f64,
    /// Vertical gap between bands.
    #[serde(default = "default_band_gap")]
    pub band_gap: f64,
    #[serde(default)]
    pub origin_x: f64,
    #[serde(default)]
    pub origin_y: f64,
    /// Band width reported as overflow (the band still grows).
    #[serde(default = "default_max_band_width")]
    pub max_band_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            business: default_business_size(),
            system: default_system_size(),
            implementation: default_implementation_size(),
            margin: default_margin(),
            group_gap: default_group_gap(),
            band_gap: default_band_gap(),
            origin_x: 0.0,
            origin_y: 0.0,
            max_band_width: default_max_band_width(),
        }
    }
}

const fn default_business_size() -> NodeSize { NodeSize { width: 220.0, height: 64.0 } }
const fn default_system_size() -> NodeSize { NodeSize { width: 180.0, height: 56.0 } }
const fn default_implementation_size() -> NodeSize { NodeSize { width: 140.0, height: 40.0 } }
const fn default_margin() -> f64 { 24.0 }
const fn default_group_gap() -> f64 { 48.0 }
const fn default_band_gap() -> f64 { 160.0 }
const fn default_max_band_width() -> f64 { 20_000.0 }

/// Colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default = "default_business_hues")]
    pub business: Vec<String>,
    #[serde(default = "default_system_hues")]
    pub system: Vec<String>,
    #[serde(default = "default_external_color")]
    pub external: String,
    /// Fallback for nodes with no colored parent.
    #[serde(default = "default_neutral_color")]
    pub neutral: String,
    /// Mix factor toward white for Implementation children (0-1).
    #[serde(default = "default_child_lighten")]
    pub child_lighten: f64,
    #[serde(default = "default_contains_color")]
    pub contains: String,
    #[serde(default = "default_depends_on_color")]
    pub depends_on: String,
    #[serde(default = "default_calls_color")]
    pub calls: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            business: default_business_hues(),
            system: default_system_hues(),
            external: default_external_color(),
            neutral: default_neutral_color(),
            child_lighten: default_child_lighten(),
            contains: default_contains_color(),
            depends_on: default_depends_on_color(),
            calls: default_calls_color(),
        }
    }
}

fn default_business_hues() -> Vec<String> {
    ["#2B3A55", "#3D5A80", "#5C4B8A", "#1F6F78", "#7A4E2D", "#4A6741"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

fn default_system_hues() -> Vec<String> {
    [
        "#D0021B", "#4A90E2", "#F5A623", "#7ED321", "#9013FE", "#50E3C2", "#BD10E0", "#8B572A",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

fn default_external_color() -> String { "#9E9E9E".to_string() }
fn default_neutral_color() -> String { "#F0F0F0".to_string() }
const fn default_child_lighten() -> f64 { 0.55 }
fn default_contains_color() -> String { "#2E7D32".to_string() }
fn default_depends_on_color() -> String { "#1565C0".to_string() }
fn default_calls_color() -> String { "#EF6C00".to_string() }

/// Shape of `tiergraph.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TierGraphToml {
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub assemble: AssembleConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub rollup: RollupConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
}
