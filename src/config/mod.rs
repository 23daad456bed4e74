// src/config/mod.rs
pub mod types;

pub use self::types::{
    AssembleConfig, ClusterConfig, InventoryConfig, LayoutConfig, NodeSize, PaletteConfig,
    RollupConfig, TierGraphToml,
};

use std::path::Path;

use crate::error::{EngineError, Result};
use crate::palette::Rgb;

/// Default config file looked up in the working directory.
pub const CONFIG_FILE: &str = "tiergraph.toml";

/// Engine configuration: every knob the pipeline stages read.
pub type EngineConfig = TierGraphToml;

impl TierGraphToml {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration. An explicit path must exist; otherwise
    /// `tiergraph.toml` in the working directory is used when present.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE).is_file() => Self::from_file(Path::new(CONFIG_FILE))?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file without validating it.
    ///
    /// # Errors
    /// Returns error on I/O or TOML failures.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::io(e, path))?;
        Self::parse_toml(&content)
    }

    /// # Errors
    /// Returns error if the TOML is malformed.
    pub fn parse_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Rejects geometry and palettes that would break layout guarantees.
    ///
    /// # Errors
    /// Returns `EngineError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.validate_cluster()?;
        self.validate_layout()?;
        self.validate_palette()
    }

    fn validate_cluster(&self) -> Result<()> {
        let c = &self.cluster;
        if !(-0.5..=1.0).contains(&c.min_modularity) {
            return Err(invalid(format!(
                "cluster.min_modularity must be within [-0.5, 1], got {}",
                c.min_modularity
            )));
        }
        if !(0.0..=100.0).contains(&c.min_coverage) {
            return Err(invalid(format!(
                "cluster.min_coverage must be within [0, 100], got {}",
                c.min_coverage
            )));
        }
        if c.domain_labels.values().any(|l| l.trim().is_empty()) {
            return Err(invalid("cluster.domain_labels contains an empty label"));
        }
        Ok(())
    }

    fn validate_layout(&self) -> Result<()> {
        let l = &self.layout;
        for (name, size) in [
            ("business", l.business),
            ("system", l.system),
            ("implementation", l.implementation),
        ] {
            if !(size.width > 0.0 && size.height > 0.0) {
                return Err(invalid(format!("layout.{name} size must be positive")));
            }
        }
        if !(l.band_gap > 0.0) {
            return Err(invalid("layout.band_gap must be positive"));
        }
        if !(l.margin >= 0.0 && l.group_gap >= 0.0) {
            return Err(invalid("layout.margin and layout.group_gap must be non-negative"));
        }
        if !(l.max_band_width > 0.0) {
            return Err(invalid("layout.max_band_width must be positive"));
        }
        Ok(())
    }

    fn validate_palette(&self) -> Result<()> {
        let p = &self.palette;
        if p.business.is_empty() || p.system.is_empty() {
            return Err(invalid("palette.business and palette.system must not be empty"));
        }
        if !(0.0..=1.0).contains(&p.child_lighten) {
            return Err(invalid("palette.child_lighten must be within [0, 1]"));
        }
        let singles = [&p.external, &p.neutral, &p.contains, &p.depends_on, &p.calls];
        for color in p.business.iter().chain(p.system.iter()).chain(singles) {
            if Rgb::parse(color).is_none() {
                return Err(invalid(format!("palette color '{color}' is not #RRGGBB")));
            }
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> EngineError {
    EngineError::Config(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::parse_toml(
            r#"
[layout]
margin = 10.0

[cluster.domain_labels]
"app/billing" = "Billing"
"#,
        );
        let Ok(config) = config else {
            panic!("toml should parse");
        };
        assert!((config.layout.margin - 10.0).abs() < f64::EPSILON);
        assert!((config.layout.band_gap - 160.0).abs() < f64::EPSILON);
        assert_eq!(
            config.cluster.domain_labels.get("app/billing").map(String::as_str),
            Some("Billing")
        );
        assert_eq!(config.rollup.max_examples, 3);
    }

    #[test]
    fn test_rejects_zero_band_gap() {
        let mut config = EngineConfig::default();
        config.layout.band_gap = 0.0;
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_color() {
        let mut config = EngineConfig::default();
        config.palette.system.push("teal".into());
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }
}
