//! Known namespaces: prefixes, URIs and the local names registered under them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;
use xule_core::{
    token::TokenKind,
    tree::{NodeId, Rule},
};

use super::unit::CompilationUnit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub prefix: String,
    pub uri: String,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NamespaceSet {
    entries: Vec<Namespace>,
}

impl NamespaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a definition file shaped `{ "prefix": { "uri": ["Local", ...] } }`.
    pub fn from_json(text: &str) -> Result<Self> {
        let parsed: BTreeMap<String, BTreeMap<String, Vec<String>>> =
            serde_json::from_str(text).context("invalid namespace definition file")?;
        let mut set = Self::new();
        for (prefix, uris) in parsed {
            for (uri, names) in uris {
                set.add(Namespace {
                    prefix: prefix.clone(),
                    uri,
                    names,
                });
            }
        }
        Ok(set)
    }

    pub fn add(&mut self, namespace: Namespace) {
        self.entries.push(namespace);
    }

    pub fn merge(&mut self, other: NamespaceSet) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Namespace] {
        &self.entries
    }

    /// Distinct prefixes in first-seen order.
    pub fn prefixes(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for ns in &self.entries {
            if !ns.prefix.is_empty() && !out.contains(&ns.prefix.as_str()) {
                out.push(&ns.prefix);
            }
        }
        out
    }

    /// Local names registered for `prefix` across all of its URIs.
    pub fn names_for(&self, prefix: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for ns in self.entries.iter().filter(|ns| ns.prefix == prefix) {
            for name in &ns.names {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
        }
        out
    }

    /// Prefixes declared with `namespace prefix = uri` anywhere in the unit.
    pub fn from_unit(unit: &CompilationUnit) -> Self {
        let mut set = Self::new();
        for file in unit.files() {
            let tree = &file.tree;
            for node in tree.descendants(tree.root()) {
                if tree.rule(node) != Some(Rule::NamespaceDeclaration) {
                    continue;
                }
                if let Some(ns) = declared_namespace(tree, node) {
                    set.add(ns);
                }
            }
        }
        set
    }
}

fn declared_namespace(tree: &xule_core::tree::SyntaxTree, node: NodeId) -> Option<Namespace> {
    let prefix = tree
        .child_token(node, TokenKind::Identifier)
        .and_then(|t| tree.token(t))
        .map(|t| t.text.clone())?;
    let uri = if let Some(url) = tree.child_token(node, TokenKind::Url) {
        tree.text(url)
    } else {
        let literal = tree.child_rule(node, Rule::StringLiteral)?;
        tree.terminals(literal)
            .into_iter()
            .filter(|t| tree.token_kind(*t) == Some(TokenKind::StringContent))
            .map(|t| tree.text(t))
            .collect()
    };
    Some(Namespace {
        prefix,
        uri,
        names: Vec::new(),
    })
}

/// Read namespace definition files one after another. Missing or malformed
/// files are logged and skipped.
pub async fn load_namespace_files(paths: &[PathBuf]) -> NamespaceSet {
    let mut set = NamespaceSet::new();
    for path in paths {
        match read_namespace_file(path).await {
            Ok(loaded) => set.merge(loaded),
            Err(e) => warn!(path = %path.display(), "skipping namespace definitions: {e:#}"),
        }
    }
    set
}

async fn read_namespace_file(path: &Path) -> Result<NamespaceSet> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    NamespaceSet::from_json(&text)
}
