// src/graph/assemble/mod.rs
//! Inventory → Implementation nodes, raw import/call edges and external stubs.

pub mod externals;
pub mod resolver;

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Value};
use tracing::debug;

use crate::config::AssembleConfig;
use crate::inventory::{FileRecord, Inventory};
use crate::model::ids;
use crate::model::{EdgeType, Level, Node, NodeKind, ReferenceKind, UnresolvedReference};

use self::resolver::ModuleIndex;

/// Call names that never point at project code.
const BUILTIN_CALLS: &[&str] = &[
    "abs", "all", "any", "Array", "Box", "clone", "console", "dict", "enumerate", "Err",
    "filter", "float", "format", "getattr", "hasattr", "int", "into", "isinstance", "iter",
    "JSON", "len", "list", "map", "max", "min", "next", "Object", "Ok", "open", "parseInt",
    "print", "println", "Promise", "range", "repr", "require", "set", "setattr",
    "setTimeout", "Some", "sorted", "str", "sum", "super", "to_string", "tuple", "type",
    "unwrap", "vec", "zip",
];

/// Where a raw edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RawKind {
    Import,
    ExternalImport,
    Call,
}

impl RawKind {
    #[must_use]
    pub fn edge_type(self) -> EdgeType {
        match self {
            Self::Import | Self::ExternalImport => EdgeType::DependsOn,
            Self::Call => EdgeType::Calls,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::ExternalImport => "external_import",
            Self::Call => "call",
        }
    }
}

/// An Implementation-level dependency before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEdge {
    pub from: String,
    pub to: String,
    pub kind: RawKind,
    /// Number of underlying import strings or call references.
    pub weight: u32,
    /// The first few import strings / call names, sorted.
    pub evidence: Vec<String>,
}

impl RawEdge {
    #[must_use]
    pub fn id(&self) -> String {
        ids::edge_id(self.kind.edge_type(), &self.from, &self.to)
    }
}

/// Everything the assembler derives from the inventory.
#[derive(Debug, Default)]
pub struct Assembly {
    /// One node per file, in path order.
    pub files: Vec<Node>,
    /// One node per detected stub kind, in kind order.
    pub stubs: Vec<Node>,
    pub raw: Vec<RawEdge>,
    pub unresolved: Vec<UnresolvedReference>,
}

#[derive(Default)]
struct EdgeBuilder {
    edges: BTreeMap<(String, String, RawKind), (u32, BTreeSet<String>)>,
}

impl EdgeBuilder {
    fn add(&mut self, from: &str, to: &str, kind: RawKind, evidence: &str) {
        if from == to {
            return;
        }
        let entry = self
            .edges
            .entry((from.to_string(), to.to_string(), kind))
            .or_default();
        entry.0 += 1;
        entry.1.insert(evidence.to_string());
    }

    fn finish(self, max_evidence: usize) -> Vec<RawEdge> {
        self.edges
            .into_iter()
            .map(|((from, to, kind), (weight, evidence))| RawEdge {
                from,
                to,
                kind,
                weight,
                evidence: evidence.into_iter().take(max_evidence).collect(),
            })
            .collect()
    }
}

/// Builds the Implementation band and its raw dependency edges.
#[must_use]
pub fn assemble(inventory: &Inventory, config: &AssembleConfig) -> Assembly {
    let index = ModuleIndex::build(inventory);
    let definitions = definition_index(inventory);

    let mut edges = EdgeBuilder::default();
    let mut stub_libraries: BTreeMap<NodeKind, BTreeSet<String>> = BTreeMap::new();
    let mut unresolved = Vec::new();

    for file in inventory.files() {
        let from = ids::implementation_id(&file.path);
        for import in &file.imports {
            match classify_import(&index, file, import) {
                ImportTarget::Local(path) => {
                    edges.add(&from, &ids::implementation_id(&path), RawKind::Import, import);
                }
                ImportTarget::Stub(kind) => {
                    let root = externals::import_root(import).to_string();
                    stub_libraries.entry(kind).or_default().insert(root);
                    edges.add(&from, &ids::external_id(kind), RawKind::ExternalImport, import);
                }
                ImportTarget::Ignored => {}
                ImportTarget::Unresolved => unresolved.push(UnresolvedReference {
                    from: file.path.clone(),
                    target: import.clone(),
                    kind: ReferenceKind::Import,
                }),
            }
        }
        for call in &file.calls {
            match resolve_call(&definitions, file, call) {
                CallTarget::Local(path) => {
                    edges.add(&from, &ids::implementation_id(path), RawKind::Call, call);
                }
                CallTarget::Ignored => {}
                CallTarget::Unresolved => unresolved.push(UnresolvedReference {
                    from: file.path.clone(),
                    target: call.clone(),
                    kind: ReferenceKind::Call,
                }),
            }
        }
    }

    let files: Vec<Node> = inventory.files().iter().map(file_node).collect();
    let stubs: Vec<Node> = stub_libraries
        .into_iter()
        .map(|(kind, libraries)| stub_node(kind, libraries))
        .collect();
    let raw = edges.finish(config.max_evidence);
    unresolved.sort();

    debug!(
        files = files.len(),
        stubs = stubs.len(),
        raw_edges = raw.len(),
        unresolved = unresolved.len(),
        "assembled implementation graph"
    );

    Assembly {
        files,
        stubs,
        raw,
        unresolved,
    }
}

enum ImportTarget {
    Local(String),
    Stub(NodeKind),
    /// Standard library or the importing file itself.
    Ignored,
    Unresolved,
}

fn classify_import(index: &ModuleIndex, file: &FileRecord, import: &str) -> ImportTarget {
    if let Some(path) = index.resolve(&file.path, import) {
        if path == file.path {
            return ImportTarget::Ignored;
        }
        return ImportTarget::Local(path.to_string());
    }
    if resolver::is_relative(import) {
        return ImportTarget::Unresolved;
    }
    if externals::is_stdlib(import) {
        return ImportTarget::Ignored;
    }
    externals::stub_kind(import).map_or(ImportTarget::Unresolved, ImportTarget::Stub)
}

enum CallTarget<'a> {
    Local(&'a str),
    Ignored,
    Unresolved,
}

/// Defined function/class name → defining paths (sorted).
fn definition_index(inventory: &Inventory) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut index: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for file in inventory.files() {
        for name in file.functions.iter().chain(&file.classes) {
            index.entry(name.as_str()).or_default().insert(file.path.as_str());
        }
    }
    index
}

fn resolve_call<'a>(
    definitions: &BTreeMap<&str, BTreeSet<&'a str>>,
    file: &FileRecord,
    call: &str,
) -> CallTarget<'a> {
    let segments: Vec<&str> = call
        .split("::")
        .flat_map(|s| s.split('.'))
        .filter(|s| !s.is_empty())
        .collect();
    let Some(name) = segments.last().copied() else {
        return CallTarget::Ignored;
    };
    if segments.len() == 1 && BUILTIN_CALLS.contains(&name) {
        return CallTarget::Ignored;
    }
    let defined_here = |n: &str| file.functions.iter().chain(&file.classes).any(|d| d == n);

    // `Type::new` falls back to the qualifier when `new` is unknown.
    let qualifier = segments.len().checked_sub(2).and_then(|i| segments.get(i)).copied();
    for candidate in std::iter::once(name).chain(qualifier) {
        if defined_here(candidate) {
            return CallTarget::Ignored;
        }
        if let Some(path) = definitions.get(candidate).and_then(|paths| paths.first().copied()) {
            return CallTarget::Local(path);
        }
    }
    if BUILTIN_CALLS.contains(&name) || qualifier.is_some_and(|q| BUILTIN_CALLS.contains(&q)) {
        return CallTarget::Ignored;
    }
    CallTarget::Unresolved
}

fn file_node(file: &FileRecord) -> Node {
    let mut node = Node::new(
        ids::implementation_id(&file.path),
        file.file_name(),
        NodeKind::File,
        Level::Implementation,
    );
    node.annotate("path", file.path.as_str());
    node.annotate("functions", strings(&file.functions));
    node.annotate("classes", strings(&file.classes));
    node.annotate("imports", file.imports.len());
    node
}

fn stub_node(kind: NodeKind, libraries: BTreeSet<String>) -> Node {
    let mut node = Node::new(ids::external_id(kind), kind.stub_name(), kind, Level::System);
    node.annotate("libraries", libraries.into_iter().collect::<Vec<_>>());
    node
}

fn strings(items: &[String]) -> Value {
    json!(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory(files: Vec<FileRecord>) -> Inventory {
        Inventory::new(files).unwrap_or_default()
    }

    #[test]
    fn test_local_external_stdlib_and_unresolved_imports() {
        let inv = inventory(vec![
            FileRecord::new("app/api.py").with_imports(&[
                "app.db",
                "os",
                "openai",
                "sqlalchemy.orm",
                "numpy",
            ]),
            FileRecord::new("app/db.py").with_imports(&["psycopg2"]),
        ]);
        let asm = assemble(&inv, &AssembleConfig::default());

        assert_eq!(asm.files.len(), 2);
        let stub_ids: Vec<_> = asm.stubs.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(stub_ids, vec!["external:llm_service", "external:managed_db"]);
        assert!(asm.stubs.iter().all(|n| n.level == Level::System && n.external));

        let db = asm.stubs.iter().find(|n| n.kind == NodeKind::ManagedDb);
        let libs = db.and_then(|n| n.metadata.get("libraries")).cloned();
        assert_eq!(libs, Some(json!(["psycopg2", "sqlalchemy"])));

        let local: Vec<_> = asm.raw.iter().filter(|e| e.kind == RawKind::Import).collect();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].to, "impl:app/db.py");

        assert_eq!(asm.unresolved.len(), 1);
        assert_eq!(asm.unresolved[0].target, "numpy");
    }

    #[test]
    fn test_calls_resolve_and_ignore_intra_file() {
        let inv = inventory(vec![
            FileRecord::new("a.py")
                .with_functions(&["helper"])
                .with_calls(&["helper", "b.compute", "Parser::new", "print", "mystery"]),
            FileRecord::new("b.py").with_functions(&["compute"]),
            FileRecord::new("c.py").with_classes(&["Parser"]),
        ]);
        let asm = assemble(&inv, &AssembleConfig::default());
        let calls: Vec<_> = asm
            .raw
            .iter()
            .filter(|e| e.kind == RawKind::Call)
            .map(|e| e.to.as_str())
            .collect();
        assert_eq!(calls, vec!["impl:b.py", "impl:c.py"]);
        assert_eq!(asm.unresolved.len(), 1);
        assert_eq!(asm.unresolved[0].kind, ReferenceKind::Call);
    }

    #[test]
    fn test_duplicate_pairs_accumulate_weight() {
        let inv = inventory(vec![
            FileRecord::new("a.py").with_imports(&["b", "b.thing", "a"]),
            FileRecord::new("b.py"),
        ]);
        let asm = assemble(&inv, &AssembleConfig::default());
        assert_eq!(asm.raw.len(), 1);
        assert_eq!(asm.raw[0].weight, 2);
        assert_eq!(asm.raw[0].evidence, vec!["b".to_string(), "b.thing".to_string()]);
        assert!(asm.unresolved.is_empty());
    }
}
