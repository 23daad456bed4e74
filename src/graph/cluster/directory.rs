// src/graph/cluster/directory.rs
//! Directory-based grouping used when modularity clustering is degenerate.

use std::collections::BTreeMap;

/// Name of the group holding files that sit at the inventory root.
pub const ROOT_GROUP: &str = "root";

/// Directory components shared by every path.
#[must_use]
pub fn common_prefix<'a>(paths: &[&'a str]) -> Vec<&'a str> {
    let mut dirs = paths.iter().map(|p| {
        let mut parts: Vec<&str> = p.split('/').collect();
        parts.pop();
        parts
    });
    let Some(mut prefix) = dirs.next() else {
        return Vec::new();
    };
    for parts in dirs {
        let shared = prefix
            .iter()
            .zip(&parts)
            .take_while(|(a, b)| a == b)
            .count();
        prefix.truncate(shared);
    }
    prefix
}

/// Group key per path: the first directory below the common prefix, or the
/// prefix's own last component (`root` without one) for files directly in it.
#[must_use]
pub fn group_keys(paths: &[&str]) -> Vec<String> {
    let prefix = common_prefix(paths);
    let own = prefix.last().copied().unwrap_or(ROOT_GROUP);
    paths
        .iter()
        .map(|p| {
            let parts: Vec<&str> = p.split('/').collect();
            let dirs = parts.len().saturating_sub(1);
            if dirs > prefix.len() {
                parts.get(prefix.len()).copied().unwrap_or(own).to_string()
            } else {
                own.to_string()
            }
        })
        .collect()
}

/// Partitions indices by group key, ordered by smallest member.
#[must_use]
pub fn fallback_groups(paths: &[&str]) -> Vec<(String, Vec<usize>)> {
    let mut by_key: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, key) in group_keys(paths).into_iter().enumerate() {
        by_key.entry(key).or_default().push(i);
    }
    let mut groups: Vec<(String, Vec<usize>)> = by_key.into_iter().collect();
    groups.sort_by_key(|(_, members)| members.first().copied().unwrap_or(usize::MAX));
    groups
}

/// Most common immediate parent directory; ties go alphabetical.
#[must_use]
pub fn dominant_parent(paths: &[&str]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for p in paths {
        let parent = p.rsplit('/').nth(1).unwrap_or(ROOT_GROUP);
        *counts.entry(parent).or_default() += 1;
    }
    // BTreeMap iterates alphabetically; max_by_key keeps the last maximum,
    // so iterate in reverse to keep the first.
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, n)| *n)
        .map_or_else(|| ROOT_GROUP.to_string(), |(name, _)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix(&["src/a/x.rs", "src/b/y.rs"]), vec!["src"]);
        assert!(common_prefix(&["app/x.py", "lib/y.py"]).is_empty());
        assert_eq!(common_prefix(&["pkg/mod/a.py"]), vec!["pkg", "mod"]);
    }

    #[test]
    fn test_group_keys() {
        let keys = group_keys(&["app/api/x.py", "app/web/y.py", "lib/shared.py", "setup.py"]);
        assert_eq!(keys, vec!["app", "app", "lib", "root"]);

        let keys = group_keys(&["src/a/x.rs", "src/b/y.rs", "src/main.rs"]);
        assert_eq!(keys, vec!["a", "b", "src"]);
    }

    #[test]
    fn test_fallback_groups_order() {
        let groups = fallback_groups(&["z/a.py", "b/c.py", "z/d.py"]);
        assert_eq!(groups, vec![("z".to_string(), vec![0, 2]), ("b".to_string(), vec![1])]);
    }

    #[test]
    fn test_dominant_parent_ties_alphabetical() {
        assert_eq!(dominant_parent(&["x/api/a.py", "x/web/b.py"]), "api");
        assert_eq!(dominant_parent(&["x/web/a.py", "x/web/b.py", "api/c.py"]), "web");
        assert_eq!(dominant_parent(&["a.py"]), "root");
    }
}
