// src/inventory.rs
//! The per-file inventory produced by the parsing collaborator.
//!
//! Records are normalized, validated and sorted by path on construction, so
//! every later stage can rely on a fixed processing order.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{EngineError, Result};

/// One analyzed source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub imports: Vec<String>,
    /// Call targets referenced from function bodies.
    #[serde(default)]
    pub calls: Vec<String>,
}

impl FileRecord {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_imports(mut self, imports: &[&str]) -> Self {
        self.imports = imports.iter().map(|s| (*s).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_functions(mut self, functions: &[&str]) -> Self {
        self.functions = functions.iter().map(|s| (*s).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_classes(mut self, classes: &[&str]) -> Self {
        self.classes = classes.iter().map(|s| (*s).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_calls(mut self, calls: &[&str]) -> Self {
        self.calls = calls.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Directory components of the path (file name excluded).
    #[must_use]
    pub fn dirs(&self) -> Vec<&str> {
        let mut parts: Vec<&str> = self.path.split('/').collect();
        parts.pop();
        parts
    }

    /// Final path component.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    fn normalize(&mut self) {
        let path = self.path.trim().replace('\\', "/");
        self.path = path
            .split('/')
            .filter(|seg| *seg != ".")
            .collect::<Vec<_>>()
            .join("/");
        for list in [
            &mut self.functions,
            &mut self.classes,
            &mut self.imports,
            &mut self.calls,
        ] {
            list.retain(|s| !s.trim().is_empty());
            for item in list.iter_mut() {
                *item = item.trim().to_string();
            }
            list.sort();
            list.dedup();
        }
    }

    fn check(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(EngineError::structural("<empty>", "file record has an empty path"));
        }
        if self.path.starts_with('/') || self.path.contains(':') {
            return Err(EngineError::structural(&self.path, "path must be relative"));
        }
        if self.path.split('/').any(|seg| seg.is_empty() || seg == "..") {
            return Err(EngineError::structural(
                &self.path,
                "path contains empty or '..' segments",
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Shard {
    List(Vec<FileRecord>),
    Wrapped { files: Vec<FileRecord> },
}

impl Shard {
    fn into_records(self) -> Vec<FileRecord> {
        match self {
            Self::List(files) | Self::Wrapped { files } => files,
        }
    }
}

/// A validated, path-sorted set of file records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    files: Vec<FileRecord>,
}

impl Inventory {
    /// Normalizes, validates and sorts records.
    ///
    /// # Errors
    /// Returns `StructuralInput` for empty, absolute or duplicate paths.
    pub fn new(mut files: Vec<FileRecord>) -> Result<Self> {
        for record in &mut files {
            record.normalize();
            record.check()?;
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        if let Some(dup) = files.windows(2).find(|w| w[0].path == w[1].path) {
            return Err(EngineError::structural(&dup[0].path, "duplicate file path"));
        }
        Ok(Self { files })
    }

    /// Parses a JSON array of records or a `{"files": [...]}` object.
    ///
    /// # Errors
    /// Returns error on malformed JSON or invalid records.
    pub fn from_json(text: &str) -> Result<Self> {
        let shard: Shard = serde_json::from_str(text)?;
        Self::new(shard.into_records())
    }

    /// Loads a JSON file, or every `*.json` shard below a directory.
    /// Shards are parsed in parallel and re-joined in path order.
    ///
    /// # Errors
    /// Returns error on I/O, JSON or validation failures.
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Self::load_dir(path);
        }
        let text = fs::read_to_string(path).map_err(|e| EngineError::io(e, path))?;
        Self::from_json(&text)
    }

    fn load_dir(dir: &Path) -> Result<Self> {
        let mut shards: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            let is_json = entry.path().extension().and_then(|e| e.to_str()) == Some("json");
            if entry.file_type().is_file() && is_json {
                shards.push(entry.into_path());
            }
        }
        info!(shards = shards.len(), dir = %dir.display(), "loading inventory shards");

        let parsed: Vec<Result<Vec<FileRecord>>> = shards
            .par_iter()
            .map(|shard| read_shard(shard))
            .collect();

        let mut files = Vec::new();
        for records in parsed {
            files.extend(records?);
        }
        Self::new(files)
    }

    #[must_use]
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Drops records with a directory component in `segments`.
    /// Returns the kept inventory and the number of dropped records.
    #[must_use]
    pub fn exclude(self, segments: &[String]) -> (Self, usize) {
        if segments.is_empty() {
            return (self, 0);
        }
        let banned: BTreeSet<String> = segments.iter().map(|s| s.to_ascii_lowercase()).collect();
        let before = self.files.len();
        let files: Vec<FileRecord> = self
            .files
            .into_iter()
            .filter(|f| {
                !f.dirs()
                    .iter()
                    .any(|d| banned.contains(&d.to_ascii_lowercase()))
            })
            .collect();
        let dropped = before - files.len();
        if dropped > 0 {
            debug!(dropped, "excluded non-core files");
        }
        (Self { files }, dropped)
    }

    /// SHA-256 of the canonical JSON encoding.
    #[must_use]
    pub fn digest(&self) -> String {
        let canonical = serde_json::to_vec(&self.files).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        format!("{:x}", hasher.finalize())
    }
}

fn read_shard(path: &Path) -> Result<Vec<FileRecord>> {
    let text = fs::read_to_string(path).map_err(|e| EngineError::io(e, path))?;
    let shard: Shard = serde_json::from_str(&text)?;
    Ok(shard.into_records())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_and_normalizes() {
        let inv = Inventory::new(vec![
            FileRecord::new("./pkg\\b.py").with_imports(&["z", "a", "a", " "]),
            FileRecord::new("pkg/a.py"),
        ]);
        let Ok(inv) = inv else {
            panic!("inventory should be valid");
        };
        let paths: Vec<_> = inv.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["pkg/a.py", "pkg/b.py"]);
        assert_eq!(inv.files()[1].imports, vec!["a".to_string(), "z".to_string()]);
    }

    #[test]
    fn test_duplicate_paths_are_structural_errors() {
        let res = Inventory::new(vec![FileRecord::new("a.py"), FileRecord::new("./a.py")]);
        assert!(matches!(res, Err(EngineError::StructuralInput { .. })));
        let res = Inventory::new(vec![FileRecord::new("a/./b.py"), FileRecord::new("a/b.py")]);
        assert!(matches!(res, Err(EngineError::StructuralInput { .. })));
        let single = Inventory::new(vec![FileRecord::new("./a/./b.py")]);
        let paths: Vec<String> = single
            .map(|i| i.files().iter().map(|f| f.path.clone()).collect())
            .unwrap_or_default();
        assert_eq!(paths, vec!["a/b.py".to_string()]);
    }

    #[test]
    fn test_rejects_bad_paths() {
        for bad in ["", "/etc/passwd", "a/../b.py", "a//b.py", "C:/x.py"] {
            let res = Inventory::new(vec![FileRecord::new(bad)]);
            assert!(res.is_err(), "expected rejection for {bad:?}");
        }
    }

    #[test]
    fn test_accepts_wrapped_json() {
        let inv = Inventory::from_json(r#"{"files": [{"path": "a.py", "imports": ["b"]}]}"#);
        assert_eq!(inv.map(|i| i.len()).ok(), Some(1));
    }

    #[test]
    fn test_exclude_only_matches_directories() {
        let inv = Inventory::new(vec![
            FileRecord::new("app/tests/test_x.py"),
            FileRecord::new("app/tests.py"),
            FileRecord::new("docs/conf.py"),
        ])
        .unwrap_or_default();
        let (kept, dropped) = inv.exclude(&["tests".into(), "docs".into()]);
        assert_eq!(dropped, 2);
        assert_eq!(kept.files()[0].path, "app/tests.py");
    }

    #[test]
    fn test_digest_is_order_independent() {
        let a = Inventory::new(vec![FileRecord::new("a.py"), FileRecord::new("b.py")])
            .unwrap_or_default();
        let b = Inventory::new(vec![FileRecord::new("b.py"), FileRecord::new("a.py")])
            .unwrap_or_default();
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
    }
}
