//! Compilation unit: the edited document plus every auto-imported file,
//! parsed and tagged with where it came from.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ropey::Rope;
use tracing::{debug, warn};
use xule_core::{
    merge_errors, parse,
    token::{Channel, LexError, ParseError, Position, Span, Token, TokenKind, tokenize, tokenize_for_completion},
    tree::{NodeId, SyntaxTree},
};

/// A node anywhere in the unit: the file it lives in plus its id in that
/// file's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef {
    pub file: usize,
    pub node: NodeId,
}

impl NodeRef {
    pub fn new(file: usize, node: NodeId) -> Self {
        Self { file, node }
    }
}

/// Raw text of a file to merge into the unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    pub origin: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub origin: String,
    pub text: Rope,
    pub tree: SyntaxTree,
    /// Lexer and parser errors, sorted by position.
    pub errors: Vec<ParseError>,
}

impl SourceFile {
    /// Parse the edited document. Its token stream carries boundary markers
    /// so completion can address the gap between two touching tokens. A
    /// fatal lexer failure leaves an empty tree and a single error.
    pub fn primary(origin: &str, text: &str) -> Self {
        match tokenize_for_completion(text) {
            Ok(lexed) => Self::from_tokens(origin, text, lexed.tokens, lexed.errors),
            Err(e) => {
                let position = match &e {
                    LexError::NestingTooDeep { position, .. } => *position,
                    LexError::ModeStackUnderflow { pending } => pending.span.start,
                };
                let eof = Token::new(
                    TokenKind::Eof,
                    String::new(),
                    Span::single(Position::start()),
                    Channel::Default,
                );
                let mut file = Self::from_tokens(origin, text, vec![eof], Vec::new());
                file.errors = vec![ParseError::with_position(e.to_string(), position)];
                file
            }
        }
    }

    /// Parse an auto-imported file.
    pub fn import(origin: &str, text: &str) -> Result<Self, LexError> {
        let lexed = tokenize(text)?;
        Ok(Self::from_tokens(origin, text, lexed.tokens, lexed.errors))
    }

    fn from_tokens(origin: &str, text: &str, tokens: Vec<Token>, lex_errors: Vec<ParseError>) -> Self {
        let out = parse(tokens);
        let errors = merge_errors(lex_errors, out.errors);
        Self {
            origin: origin.to_string(),
            text: Rope::from_str(text),
            tree: out.tree,
            errors,
        }
    }
}

/// Ordered set of parsed files. File 0 is always the primary document.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    files: Vec<SourceFile>,
}

impl CompilationUnit {
    pub fn new(primary: SourceFile) -> Self {
        Self { files: vec![primary] }
    }

    /// Build a unit from the primary text plus already loaded imports. An
    /// import with the primary's origin is skipped; imports the lexer
    /// cannot handle are logged and dropped.
    pub fn assemble(origin: &str, text: &str, imports: &[LoadedSource]) -> Self {
        let mut unit = Self::new(SourceFile::primary(origin, text));
        for source in imports {
            if source.origin == origin {
                continue;
            }
            match SourceFile::import(&source.origin, &source.text) {
                Ok(file) => {
                    if !file.errors.is_empty() {
                        debug!(origin = %source.origin, errors = file.errors.len(), "auto-import has syntax errors");
                    }
                    unit.push(file);
                }
                Err(e) => warn!(origin = %source.origin, "skipping auto-import: {e}"),
            }
        }
        unit
    }

    pub fn push(&mut self, file: SourceFile) {
        self.files.push(file);
    }

    pub fn primary(&self) -> &SourceFile {
        &self.files[0]
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, index: usize) -> Option<&SourceFile> {
        self.files.get(index)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn imports(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().skip(1)
    }

    /// Origin of the file whose tree contains `node`, found by walking to
    /// the node's root.
    pub fn origin_of(&self, node: NodeRef) -> Option<&str> {
        let file = self.files.get(node.file)?;
        if node.node.index() >= file.tree.len() {
            return None;
        }
        let root = file.tree.ancestors(node.node).last()?;
        (root == file.tree.root()).then_some(file.origin.as_str())
    }
}

/// Read auto-import files in order. The primary path and unreadable files are
/// skipped; the latter with a warning.
pub async fn load_sources(paths: &[PathBuf], primary: Option<&Path>) -> Vec<LoadedSource> {
    let mut loaded = Vec::new();
    for path in paths {
        if primary.is_some_and(|p| same_file(p, path)) {
            continue;
        }
        match read_source(path).await {
            Ok(source) => loaded.push(source),
            Err(e) => warn!("skipping auto-import: {e:#}"),
        }
    }
    loaded
}

async fn read_source(path: &Path) -> Result<LoadedSource> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    Ok(LoadedSource {
        origin: path.display().to_string(),
        text,
    })
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_lookup_per_file() {
        let imports = vec![LoadedSource {
            origin: "lib.xule".to_string(),
            text: "constant $rate = 2".to_string(),
        }];
        let unit = CompilationUnit::assemble("main.xule", "output o $rate", &imports);
        assert_eq!(unit.len(), 2);
        let deep = unit.file(1).unwrap().tree.terminals(NodeId(0))[0];
        assert_eq!(unit.origin_of(NodeRef::new(1, deep)), Some("lib.xule"));
        assert_eq!(unit.origin_of(NodeRef::new(0, NodeId(0))), Some("main.xule"));
        assert_eq!(unit.origin_of(NodeRef::new(5, NodeId(0))), None);
    }

    #[test]
    fn test_primary_origin_not_imported_twice() {
        let imports = vec![LoadedSource {
            origin: "main.xule".to_string(),
            text: "constant $x = 1".to_string(),
        }];
        let unit = CompilationUnit::assemble("main.xule", "output o 1", &imports);
        assert_eq!(unit.len(), 1);
    }

    #[test]
    fn test_import_with_syntax_errors_is_kept() {
        let imports = vec![LoadedSource {
            origin: "broken.xule".to_string(),
            text: "constant $x = \nfunction f() 1".to_string(),
        }];
        let unit = CompilationUnit::assemble("main.xule", "output o f()", &imports);
        assert_eq!(unit.len(), 2);
        assert!(!unit.file(1).unwrap().errors.is_empty());
    }

    #[test]
    fn test_fatal_lex_error_in_primary() {
        let text = "output o ".to_string() + &"{".repeat(300);
        let file = SourceFile::primary("deep.xule", &text);
        assert_eq!(file.errors.len(), 1);
        assert!(file.errors[0].message.contains("nesting"));
        assert_eq!(file.tree.children(file.tree.root()).len(), 1);
    }

    #[tokio::test]
    async fn test_load_sources_skips_missing_and_primary() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib.xule");
        let main = dir.path().join("main.xule");
        std::fs::write(&lib, "constant $a = 1").unwrap();
        std::fs::write(&main, "output o 1").unwrap();
        let paths = vec![lib.clone(), dir.path().join("missing.xule"), main.clone()];
        let loaded = load_sources(&paths, Some(&main)).await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "constant $a = 1");
    }
}
