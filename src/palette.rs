// src/palette.rs
//! Color assignment. Pure function of topology and creation order.

use std::collections::BTreeMap;

use crate::config::PaletteConfig;
use crate::model::{EdgeType, Graph, Level};

/// An sRGB triple parsed from `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub fn parse(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Mixes toward white by `amount` (0 = unchanged, 1 = white).
    #[must_use]
    pub fn lighten(self, amount: f64) -> Self {
        let t = amount.clamp(0.0, 1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mix = |c: u8| -> u8 {
            let v = f64::from(c) + (255.0 - f64::from(c)) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r),
            g: mix(self.g),
            b: mix(self.b),
        }
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Assigns node and edge colors.
///
/// Business and System hues cycle in node order, which is creation order.
/// Stubs take the external color. Implementation nodes are their System
/// color lightened by `child_lighten`; orphans get the neutral color.
pub fn paint(graph: &mut Graph, palette: &PaletteConfig) {
    let mut system_colors: BTreeMap<String, String> = BTreeMap::new();
    let mut business_i = 0usize;
    let mut system_i = 0usize;

    for node in &mut graph.nodes {
        let color = if node.external {
            palette.external.clone()
        } else {
            match node.level {
                Level::Business => {
                    let c = cycle(&palette.business, business_i, &palette.neutral);
                    business_i += 1;
                    c
                }
                Level::System => {
                    let c = cycle(&palette.system, system_i, &palette.neutral);
                    system_i += 1;
                    c
                }
                Level::Implementation => continue,
            }
        };
        if node.level == Level::System {
            system_colors.insert(node.id.clone(), color.clone());
        }
        node.color = Some(color);
    }

    let parents: BTreeMap<String, String> = graph
        .parents()
        .into_iter()
        .map(|(c, p)| (c.to_string(), p.to_string()))
        .collect();

    for node in graph
        .nodes
        .iter_mut()
        .filter(|n| n.level == Level::Implementation)
    {
        let lightened = parents
            .get(&node.id)
            .and_then(|p| system_colors.get(p))
            .and_then(|hex| Rgb::parse(hex))
            .map(|rgb| rgb.lighten(palette.child_lighten).to_hex());
        node.color = Some(lightened.unwrap_or_else(|| palette.neutral.clone()));
    }

    for edge in &mut graph.edges {
        let color = match edge.edge_type {
            EdgeType::Contains => &palette.contains,
            EdgeType::DependsOn => &palette.depends_on,
            EdgeType::Calls => &palette.calls,
        };
        edge.color = Some(color.clone());
    }
}

fn cycle(hues: &[String], i: usize, fallback: &str) -> String {
    if hues.is_empty() {
        return fallback.to_string();
    }
    hues.get(i % hues.len())
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node, NodeKind};

    #[test]
    fn test_parse_and_format() {
        assert_eq!(Rgb::parse("#ff0000"), Some(Rgb { r: 255, g: 0, b: 0 }));
        assert_eq!(Rgb::parse("ff0000"), None);
        assert_eq!(Rgb::parse("#ff00"), None);
        assert_eq!(Rgb::parse("#gg0000"), None);
        assert_eq!(Rgb { r: 1, g: 171, b: 255 }.to_hex(), "#01ABFF");
    }

    #[test]
    fn test_lighten_bounds() {
        let c = Rgb { r: 0, g: 100, b: 255 };
        assert_eq!(c.lighten(0.0), c);
        assert_eq!(c.lighten(1.0), Rgb { r: 255, g: 255, b: 255 });
        assert_eq!(c.lighten(0.5), Rgb { r: 128, g: 178, b: 255 });
    }

    #[test]
    fn test_paint_cycles_and_lightens() {
        let palette = PaletteConfig {
            system: vec!["#000000".into(), "#FFFFFF".into()],
            child_lighten: 0.5,
            ..PaletteConfig::default()
        };
        let mut graph = Graph::default();
        for name in ["a", "b", "c"] {
            graph.nodes.push(Node::new(
                format!("system:{name}"),
                name,
                NodeKind::Cluster,
                Level::System,
            ));
        }
        graph.nodes.push(Node::new(
            "impl:a.py".into(),
            "a.py",
            NodeKind::File,
            Level::Implementation,
        ));
        graph.nodes.push(Node::new(
            "impl:orphan.py".into(),
            "orphan.py",
            NodeKind::File,
            Level::Implementation,
        ));
        graph.edges.push(Edge::contains("system:a", "impl:a.py"));

        paint(&mut graph, &palette);

        let color = |id: &str| graph.node(id).and_then(|n| n.color.clone());
        assert_eq!(color("system:a").as_deref(), Some("#000000"));
        assert_eq!(color("system:b").as_deref(), Some("#FFFFFF"));
        assert_eq!(color("system:c").as_deref(), Some("#000000"));
        assert_eq!(color("impl:a.py").as_deref(), Some("#808080"));
        assert_eq!(color("impl:orphan.py"), Some(palette.neutral.clone()));
        assert_eq!(graph.edges[0].color, Some(palette.contains.clone()));
    }
}
