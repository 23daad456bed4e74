// src/graph/assemble/externals.rs
//! Recognizes third-party imports that stand for an external system.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::NodeKind;

/// Patterns in precedence order. The first matching kind wins.
static STUB_PATTERNS: LazyLock<Vec<(NodeKind, Regex)>> = LazyLock::new(|| {
    [
        (
            NodeKind::LlmService,
            r"openai|anthropic|@anthropic-ai|cohere|mistralai|groq|ollama|langchain[\w-]*|@langchain|llama_index|llamaindex|transformers|huggingface_hub|tiktoken|vertexai|google\.generativeai|async_openai",
        ),
        (
            NodeKind::AuthProvider,
            r"auth0|okta|firebase_admin|passport[\w-]*|jwt|pyjwt|jose|python_jose|jsonwebtoken|authlib|oauthlib|keycloak|next-auth|@clerk|@auth0|oauth2",
        ),
        (
            NodeKind::ManagedDb,
            r"psycopg2?|asyncpg|pymongo|motor|redis|aioredis|sqlalchemy|pymysql|mysql|mongoose|mongodb|pg|prisma|@prisma|sequelize|typeorm|knex|elasticsearch|supabase|pinecone|chromadb|neo4j|cassandra|diesel|sqlx|sea_orm",
        ),
        (
            NodeKind::ExternalApi,
            r"requests|httpx|aiohttp|urllib3|axios|node-fetch|got|superagent|stripe|twilio|sendgrid|slack_sdk|boto3|botocore|googleapiclient|reqwest|hyper|ureq",
        ),
    ]
    .into_iter()
    .map(|(kind, names)| {
        let re = Regex::new(&format!(r"^(?:{names})(?:[./:]|$)"))
            .unwrap_or_else(|_| panic!("Invalid Regex"));
        (kind, re)
    })
    .collect()
});

static STDLIB: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    [
        // python
        "__future__", "abc", "argparse", "asyncio", "base64", "bisect", "builtins", "collections",
        "concurrent", "configparser", "contextlib", "copy", "csv", "dataclasses", "datetime",
        "decimal", "email", "enum", "fnmatch", "fractions", "functools", "gc", "glob", "gzip",
        "hashlib", "heapq", "hmac", "html", "http", "importlib", "inspect", "io", "itertools",
        "json", "logging", "math", "multiprocessing", "operator", "os", "pathlib", "pickle",
        "platform", "pprint", "queue", "random", "re", "secrets", "shutil", "signal", "socket",
        "sqlite3", "ssl", "statistics", "string", "struct", "subprocess", "sys", "tarfile",
        "tempfile", "textwrap", "threading", "time", "traceback", "types", "typing", "unittest",
        "urllib", "uuid", "warnings", "weakref", "xml", "zipfile", "zlib",
        // node
        "assert", "buffer", "child_process", "crypto", "dns", "events", "fs", "net", "path",
        "process", "querystring", "readline", "stream", "tls", "url", "util", "worker_threads",
        // rust
        "std", "core", "alloc",
    ]
    .into_iter()
    .collect()
});

/// First segment of a module specifier (`@scope/pkg` keeps its scope).
#[must_use]
pub fn import_root(import: &str) -> &str {
    let trimmed = import.strip_prefix("node:").unwrap_or(import);
    if trimmed.starts_with('@') {
        let mut parts = trimmed.splitn(3, '/');
        let scope = parts.next().map_or(0, str::len);
        let pkg = parts.next().map_or(0, |p| p.len() + 1);
        return trimmed.get(..scope + pkg).unwrap_or(trimmed);
    }
    trimmed
        .split(|c| c == '.' || c == '/' || c == ':')
        .next()
        .unwrap_or(trimmed)
}

#[must_use]
pub fn is_stdlib(import: &str) -> bool {
    import.starts_with("node:") || STDLIB.contains(import_root(import))
}

/// Stub kind for an import, by fixed precedence.
#[must_use]
pub fn stub_kind(import: &str) -> Option<NodeKind> {
    let lowered = import.to_ascii_lowercase();
    STUB_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(&lowered))
        .map(|(kind, _)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_kinds() {
        assert_eq!(stub_kind("openai"), Some(NodeKind::LlmService));
        assert_eq!(stub_kind("langchain_core.messages"), Some(NodeKind::LlmService));
        assert_eq!(stub_kind("@anthropic-ai/sdk"), Some(NodeKind::LlmService));
        assert_eq!(stub_kind("jwt"), Some(NodeKind::AuthProvider));
        assert_eq!(stub_kind("sqlalchemy.orm"), Some(NodeKind::ManagedDb));
        assert_eq!(stub_kind("requests"), Some(NodeKind::ExternalApi));
        assert_eq!(stub_kind("requests_cache"), None);
        assert_eq!(stub_kind("numpy"), None);
    }

    #[test]
    fn test_stdlib() {
        assert!(is_stdlib("os.path"));
        assert!(is_stdlib("std::collections::HashMap"));
        assert!(is_stdlib("node:fs"));
        assert!(!is_stdlib("osmnx"));
    }

    #[test]
    fn test_import_root() {
        assert_eq!(import_root("@scope/pkg/sub"), "@scope/pkg");
        assert_eq!(import_root("a.b.c"), "a");
        assert_eq!(import_root("crate::x"), "crate");
    }
}
