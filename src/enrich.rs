// src/enrich.rs
//! Boundary to the semantic enrichment collaborator.
//!
//! Enrichment runs after the graph is final. It may attach `purpose` and
//! `responsibilities` strings to Business and System nodes and nothing else.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::model::{Graph, Level};

/// Fields a response must never touch.
const FORBIDDEN: &[&str] = &["level", "members", "position"];
/// Member names listed in a request summary.
const SUMMARY_MEMBERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRequest {
    pub id: String,
    pub name: String,
    pub level: Level,
    pub member_summary: String,
}

/// Anything that can describe a node. Returning `None` leaves it untouched.
pub trait Enricher {
    fn enrich(&self, request: &EnrichmentRequest) -> Option<Value>;
}

/// Responses read from a JSON object keyed by node id.
#[derive(Debug, Default)]
pub struct JsonFileEnricher {
    responses: BTreeMap<String, Value>,
}

impl JsonFileEnricher {
    /// # Errors
    /// Returns error if the file cannot be read or is not a JSON object.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(e, path))?;
        let responses: BTreeMap<String, Value> = serde_json::from_str(&text)?;
        Ok(Self { responses })
    }
}

impl Enricher for JsonFileEnricher {
    fn enrich(&self, request: &EnrichmentRequest) -> Option<Value> {
        self.responses.get(&request.id).cloned()
    }
}

/// What happened when responses were applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentOutcome {
    pub enriched_nodes: usize,
    /// Attempts to change `level`, `members` or `position`.
    pub rejected_fields: usize,
    /// Unknown keys and non-string values.
    pub ignored_fields: usize,
}

/// One request per Business and System node, in graph order.
#[must_use]
pub fn enrichment_requests(graph: &Graph) -> Vec<EnrichmentRequest> {
    let names: BTreeMap<&str, &str> = graph
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.name.as_str()))
        .collect();
    graph
        .nodes
        .iter()
        .filter(|n| n.level != Level::Implementation)
        .map(|n| {
            let listed: Vec<&str> = n
                .members
                .iter()
                .take(SUMMARY_MEMBERS)
                .map(|m| names.get(m.as_str()).copied().unwrap_or(m.as_str()))
                .collect();
            let more = n.members.len().saturating_sub(listed.len());
            let mut member_summary = format!("{} members: {}", n.members.len(), listed.join(", "));
            if more > 0 {
                member_summary.push_str(&format!(" (+{more} more)"));
            }
            EnrichmentRequest {
                id: n.id.clone(),
                name: n.name.clone(),
                level: n.level,
                member_summary,
            }
        })
        .collect()
}

/// Applies enricher responses, accepting only string `purpose` and
/// `responsibilities`.
pub fn apply_enrichment(graph: &mut Graph, enricher: &dyn Enricher) -> EnrichmentOutcome {
    let mut outcome = EnrichmentOutcome::default();
    for request in enrichment_requests(graph) {
        let Some(response) = enricher.enrich(&request) else {
            continue;
        };
        let Some(fields) = response.as_object() else {
            warn!(node = %request.id, "enrichment response is not an object");
            outcome.ignored_fields += 1;
            continue;
        };
        let Some(node) = graph.nodes.iter_mut().find(|n| n.id == request.id) else {
            continue;
        };

        let mut touched = false;
        for (key, value) in fields {
            match (key.as_str(), value.as_str()) {
                ("purpose", Some(text)) => {
                    node.purpose = Some(text.to_string());
                    touched = true;
                }
                ("responsibilities", Some(text)) => {
                    node.responsibilities = Some(text.to_string());
                    touched = true;
                }
                (k, _) if FORBIDDEN.contains(&k) => {
                    warn!(node = %request.id, field = k, "rejected enrichment field");
                    outcome.rejected_fields += 1;
                }
                (k, _) => {
                    debug!(node = %request.id, field = k, "ignored enrichment field");
                    outcome.ignored_fields += 1;
                }
            }
        }
        if touched {
            outcome.enriched_nodes += 1;
        }
    }
    info!(
        enriched = outcome.enriched_nodes,
        rejected = outcome.rejected_fields,
        ignored = outcome.ignored_fields,
        "applied enrichment"
    );
    outcome
}
