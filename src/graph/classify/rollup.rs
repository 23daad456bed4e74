// src/graph/classify/rollup.rs
//! Aggregates raw Implementation edges into System-level `depends_on` edges.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::graph::assemble::RawEdge;
use crate::model::{Edge, EdgeType};

#[derive(Default)]
struct Bucket {
    raw_ids: Vec<String>,
    counts: BTreeMap<&'static str, usize>,
}

/// One edge per ordered System pair `(A, B)`, `A != B`, with at least one raw
/// edge between their members. `system_of` maps file and stub ids to the
/// System they roll up into.
#[must_use]
pub fn rollup(raw: &[RawEdge], system_of: &BTreeMap<&str, &str>, max_examples: usize) -> Vec<Edge> {
    let mut buckets: BTreeMap<(&str, &str), Bucket> = BTreeMap::new();
    for edge in raw {
        let (Some(&from), Some(&to)) = (
            system_of.get(edge.from.as_str()),
            system_of.get(edge.to.as_str()),
        ) else {
            continue;
        };
        if from == to {
            continue;
        }
        let bucket = buckets.entry((from, to)).or_default();
        bucket.raw_ids.push(edge.id());
        *bucket.counts.entry(edge.kind.label()).or_default() += 1;
    }

    buckets
        .into_iter()
        .map(|((from, to), mut bucket)| {
            bucket.raw_ids.sort();
            let weight = u32::try_from(bucket.raw_ids.len()).unwrap_or(u32::MAX);
            let mut edge = Edge::new(from, to, EdgeType::DependsOn, weight);
            let examples: Vec<&String> = bucket.raw_ids.iter().take(max_examples).collect();
            let counts: Map<String, Value> = bucket
                .counts
                .into_iter()
                .map(|(k, v)| (k.to_string(), json!(v)))
                .collect();
            edge.metadata.insert("rollup".into(), json!(true));
            edge.metadata.insert("examples".into(), json!(examples));
            edge.metadata.insert("counts".into(), Value::Object(counts));
            edge
        })
        .collect()
}
