// src/graph/cluster/domains.rs
//! Business domain assignment for System clusters.

use std::collections::BTreeMap;

/// Domain for clusters no rule recognizes.
pub const OTHER: &str = "Other";
/// Domain holding every external stub.
pub const EXTERNAL: &str = "External Dependencies";
/// Heuristic domain whose clusters face the user.
pub const INTERFACE: &str = "Interface";

/// Ordered rule table: earlier rules win ties.
const RULES: &[(&str, &[&str])] = &[
    (
        INTERFACE,
        &[
            "api", "apis", "routes", "views", "controllers", "handlers", "web", "http",
            "endpoints", "cli", "ui",
        ],
    ),
    (
        "Core Services",
        &["services", "service", "core", "domain", "business", "logic", "engine"],
    ),
    (
        "Data",
        &[
            "models", "schemas", "entities", "data", "db", "database", "repo", "repositories",
            "storage", "managers", "migrations",
        ],
    ),
    (
        "Integrations",
        &["integrations", "clients", "external", "adapters", "connectors", "providers"],
    ),
    (
        "Shared Utilities",
        &["utils", "util", "helpers", "common", "shared", "lib", "libs"],
    ),
    ("Configuration", &["config", "configs", "settings"]),
];

/// Rule index matched by a single path, deepest directory first.
fn rule_for(path: &str) -> Option<usize> {
    let mut dirs: Vec<&str> = path.split('/').collect();
    dirs.pop();
    dirs.iter().rev().find_map(|dir| {
        let dir = dir.to_ascii_lowercase();
        RULES.iter().position(|(_, words)| words.contains(&dir.as_str()))
    })
}

/// Keyword heuristic: majority vote of member paths, ties by rule order.
/// Falls back to the cluster name itself when no member path matches.
#[must_use]
pub fn heuristic_domain(cluster_name: &str, member_paths: &[&str]) -> Option<&'static str> {
    let mut votes = vec![0usize; RULES.len()];
    for path in member_paths {
        if let Some(rule) = rule_for(path) {
            if let Some(v) = votes.get_mut(rule) {
                *v += 1;
            }
        }
    }
    let best = votes.iter().copied().max().unwrap_or(0);
    if best > 0 {
        let winner = votes.iter().position(|v| *v == best)?;
        return RULES.get(winner).map(|(label, _)| *label);
    }
    let name = cluster_name.to_ascii_lowercase();
    RULES
        .iter()
        .find(|(_, words)| words.contains(&name.as_str()))
        .map(|(label, _)| *label)
}

/// Explicit labels: longest matching prefix per path, majority vote,
/// ties alphabetical.
#[must_use]
pub fn labelled_domain(labels: &BTreeMap<String, String>, member_paths: &[&str]) -> Option<String> {
    let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
    for path in member_paths {
        let matched = labels
            .iter()
            .filter(|(prefix, _)| covers(prefix, path))
            .max_by_key(|(prefix, _)| prefix.len());
        if let Some((_, label)) = matched {
            *votes.entry(label.as_str()).or_default() += 1;
        }
    }
    votes
        .into_iter()
        .rev()
        .max_by_key(|(_, n)| *n)
        .map(|(label, _)| label.to_string())
}

fn covers(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    prefix.is_empty()
        || path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Final domain: explicit label, then heuristic, then `Other`.
#[must_use]
pub fn assign_domain(
    labels: &BTreeMap<String, String>,
    cluster_name: &str,
    member_paths: &[&str],
) -> String {
    labelled_domain(labels, member_paths)
        .or_else(|| heuristic_domain(cluster_name, member_paths).map(str::to_string))
        .unwrap_or_else(|| OTHER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_majority_and_tie_order() {
        assert_eq!(
            heuristic_domain("app", &["app/api/x.py", "app/web/y.py"]),
            Some(INTERFACE)
        );
        assert_eq!(
            heuristic_domain("mix", &["m/models/a.py", "m/api/b.py"]),
            Some(INTERFACE)
        );
        assert_eq!(
            heuristic_domain("mix", &["m/models/a.py", "m/db/b.py", "m/api/c.py"]),
            Some("Data")
        );
        assert_eq!(heuristic_domain("utils", &["x.py"]), Some("Shared Utilities"));
        assert_eq!(heuristic_domain("misc", &["misc/x.py"]), None);
    }

    #[test]
    fn test_deepest_directory_wins_per_path() {
        assert_eq!(heuristic_domain("x", &["services/api/a.py"]), Some(INTERFACE));
    }

    #[test]
    fn test_labels_take_precedence() {
        let mut labels = BTreeMap::new();
        labels.insert("app".to_string(), "Platform".to_string());
        labels.insert("app/billing".to_string(), "Billing".to_string());
        let paths = ["app/billing/a.py", "app/billing/b.py", "app/api/c.py"];
        assert_eq!(assign_domain(&labels, "app", &paths), "Billing");
        assert_eq!(assign_domain(&labels, "app", &["application/x.py"]), OTHER);
        assert_eq!(assign_domain(&BTreeMap::new(), "misc", &["misc/x.py"]), OTHER);
    }
}
