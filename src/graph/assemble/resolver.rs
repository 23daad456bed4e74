// src/graph/assemble/resolver.rs
//! Resolves import specifiers against the files present in the inventory.
//!
//! Every file is registered under a dotted module key (`app/api/x.py` is
//! `app.api.x`, `pkg/__init__.py` is `pkg`) and under each suffix of that key,
//! so bare `api.x` or `x` imports find it too.

use std::collections::{BTreeMap, BTreeSet};

use crate::inventory::Inventory;

/// True for files that stand for their enclosing directory.
fn is_package_file(file_name: &str) -> bool {
    let (stem, ext) = file_name.rsplit_once('.').unwrap_or((file_name, ""));
    match ext {
        "py" => stem == "__init__",
        "js" | "jsx" | "ts" | "tsx" | "mjs" => stem == "index",
        "rs" => matches!(stem, "mod" | "lib" | "main"),
        _ => false,
    }
}

/// Dotted module key for a relative file path.
#[must_use]
pub fn module_key(path: &str) -> String {
    let mut parts: Vec<&str> = path.split('/').collect();
    if let Some(last) = parts.pop() {
        if parts.is_empty() || !is_package_file(last) {
            parts.push(last.rsplit_once('.').map_or(last, |(stem, _)| stem));
        }
    }
    parts.join(".")
}

/// Relative specifiers never fall through to stdlib or stub matching.
#[must_use]
pub fn is_relative(import: &str) -> bool {
    import.starts_with('.') || import.starts_with("self::") || import.starts_with("super::")
}

/// Directory components a relative import is anchored at.
fn module_dir(path: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = path.split('/').collect();
    parts.pop();
    parts
}

pub struct ModuleIndex {
    exact: BTreeMap<String, String>,
    suffixes: BTreeMap<String, BTreeSet<String>>,
}

impl ModuleIndex {
    #[must_use]
    pub fn build(inventory: &Inventory) -> Self {
        let mut exact = BTreeMap::new();
        let mut suffixes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for file in inventory.files() {
            let key = module_key(&file.path);
            // Records are path-sorted, so the first claimant of a key wins.
            exact.entry(key.clone()).or_insert_with(|| file.path.clone());

            let segments: Vec<&str> = key.split('.').collect();
            for start in 1..segments.len() {
                suffixes
                    .entry(segments[start..].join("."))
                    .or_default()
                    .insert(file.path.clone());
            }
        }
        Self { exact, suffixes }
    }

    /// Resolves `import` as seen from `importer`. Returns the target path.
    #[must_use]
    pub fn resolve(&self, importer: &str, import: &str) -> Option<&str> {
        let import = import.strip_prefix("crate::").unwrap_or(import);
        if let Some(anchored) = anchor(importer, import) {
            return self.lookup_prefixes(&anchored?, false);
        }
        let dotted = import.replace("::", ".").replace('/', ".");
        self.lookup_prefixes(&strip_source_ext(&dotted), true)
    }

    /// Tries the full key, then ever shorter prefixes (`a.b.C` → `a.b`).
    fn lookup_prefixes(&self, key: &str, allow_suffix: bool) -> Option<&str> {
        let segments: Vec<&str> = key.split('.').filter(|s| !s.is_empty()).collect();
        for end in (1..=segments.len()).rev() {
            let candidate = segments[..end].join(".");
            if let Some(path) = self.exact.get(&candidate) {
                return Some(path);
            }
            if allow_suffix {
                if let Some(path) = self.suffixes.get(&candidate).and_then(|s| s.first()) {
                    return Some(path);
                }
            }
        }
        None
    }
}

/// Turns a relative import into an absolute module key.
///
/// Returns `None` for non-relative imports and `Some(None)` for relative
/// imports that climb above the inventory root.
fn anchor(importer: &str, import: &str) -> Option<Option<String>> {
    let dir = module_dir(importer);

    if import.starts_with("./") || import.starts_with("../") {
        return Some(join_relative(dir, import.split('/')));
    }
    if import.starts_with("self::") || import.starts_with("super::") {
        let mut base = dir;
        let file_name = importer.rsplit('/').next().unwrap_or(importer);
        // `foo.rs` owns the `foo/` directory; `mod.rs` owns its own directory.
        if !is_package_file(file_name) {
            base.push(file_name.strip_suffix(".rs").unwrap_or(file_name));
        }
        let segments = import.split("::").map(|s| match s {
            "self" => ".",
            "super" => "..",
            other => other,
        });
        return Some(join_relative(base, segments));
    }
    if import.starts_with('.') {
        let dots = import.chars().take_while(|c| *c == '.').count();
        let rest = import.get(dots..).unwrap_or_default();
        let mut base = dir;
        for _ in 1..dots {
            if base.pop().is_none() {
                return Some(None);
            }
        }
        let mut key: Vec<String> = base.iter().map(|s| (*s).to_string()).collect();
        key.extend(rest.split('.').filter(|s| !s.is_empty()).map(str::to_string));
        return Some(Some(key.join(".")));
    }
    None
}

fn join_relative<'a>(
    mut base: Vec<&'a str>,
    segments: impl Iterator<Item = &'a str>,
) -> Option<String> {
    for seg in segments {
        match seg {
            "" | "." => {}
            ".." => {
                base.pop()?;
            }
            other => base.push(other),
        }
    }
    let joined = base.join(".");
    Some(strip_source_ext(&joined))
}

fn strip_source_ext(key: &str) -> String {
    for ext in [".tsx", ".jsx", ".ts", ".js", ".mjs", ".py", ".rs"] {
        if let Some(stripped) = key.strip_suffix(ext) {
            return stripped.to_string();
        }
    }
    key.to_string()
}
