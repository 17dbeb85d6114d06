use std::sync::Arc;

use once_cell::sync::Lazy;
use tower_lsp::lsp_types::{CompletionItem, Diagnostic, Position};
use xule_core::vocab::Vocabulary;

pub mod checker;
mod completions;
mod definition;
pub mod namespaces;
pub mod position;
pub mod symbols;
#[cfg(test)]
mod tests;
pub mod unit;
pub mod utils;

pub use definition::DefinitionTarget;
pub use namespaces::{Namespace, NamespaceSet, load_namespace_files};
pub use unit::{CompilationUnit, LoadedSource, NodeRef, SourceFile, load_sources};

use symbols::SymbolTable;

/// Built-in names shared by every analysis.
pub static VOCABULARY: Lazy<Vocabulary> = Lazy::new(|| {
    xule_stdlib::standard_vocabulary().unwrap_or_else(|e| {
        tracing::error!("failed to build the built-in vocabulary: {e:#}");
        Vocabulary::new()
    })
});

/// Which reference checks run. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSettings {
    pub functions: bool,
    pub properties: bool,
    pub variables: bool,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            functions: true,
            properties: true,
            variables: true,
        }
    }
}

/// Everything one validation pass produced for a document, kept for later
/// completion and definition requests.
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub unit: CompilationUnit,
    pub symbols: SymbolTable,
    /// Configured namespaces merged with those declared in the unit.
    pub namespaces: NamespaceSet,
    configured_namespaces: NamespaceSet,
}

impl DocumentState {
    fn build(unit: CompilationUnit, configured_namespaces: NamespaceSet) -> Self {
        let symbols = SymbolTable::build(&unit);
        let mut namespaces = configured_namespaces.clone();
        namespaces.merge(NamespaceSet::from_unit(&unit));
        Self {
            unit,
            symbols,
            namespaces,
            configured_namespaces,
        }
    }

    /// Same imports and configured namespaces, new primary text. Used to
    /// answer requests against a buffer that changed after the last pass.
    pub fn with_primary_text(&self, text: &str) -> Self {
        let primary = self.unit.primary();
        let mut unit = CompilationUnit::new(SourceFile::primary(&primary.origin, text));
        for file in self.unit.imports() {
            unit.push(file.clone());
        }
        Self::build(unit, self.configured_namespaces.clone())
    }

    pub fn completions(&self, position: Position) -> Vec<CompletionItem> {
        let (line, column) = utils::position_to_line_col(&self.unit.primary().text, position);
        completions::complete(self, &VOCABULARY, line, column)
    }

    pub fn definition(&self, position: Position) -> Option<DefinitionTarget> {
        let (line, column) = utils::position_to_line_col(&self.unit.primary().text, position);
        definition::find_definition(self, line, column)
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisInput {
    /// Identifier of the edited document, usually its URI.
    pub origin: String,
    pub text: String,
    pub imports: Vec<LoadedSource>,
    pub namespaces: NamespaceSet,
}

impl AnalysisInput {
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
            imports: Vec::new(),
            namespaces: NamespaceSet::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub diagnostics: Vec<Diagnostic>,
    pub state: Arc<DocumentState>,
}

/// Runs the validation pipeline: parse, assemble the unit, build the symbol
/// table and check references.
#[derive(Debug, Clone, Default)]
pub struct XuleAnalyzer {
    checks: CheckSettings,
}

impl XuleAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_checks(checks: CheckSettings) -> Self {
        Self { checks }
    }

    pub fn analyze(&self, input: AnalysisInput) -> AnalysisResult {
        let unit = CompilationUnit::assemble(&input.origin, &input.text, &input.imports);
        let state = DocumentState::build(unit, input.namespaces);
        let diagnostics = checker::check(&state.unit, &state.symbols, &VOCABULARY, &self.checks);
        tracing::debug!(
            origin = %input.origin,
            files = state.unit.len(),
            envs = state.symbols.env_count(),
            diagnostics = diagnostics.len(),
            "analyzed document"
        );
        AnalysisResult {
            diagnostics,
            state: Arc::new(state),
        }
    }

    /// Analyze a standalone document with no imports or namespaces.
    pub fn analyze_text(&self, text: &str) -> AnalysisResult {
        self.analyze(AnalysisInput::new("untitled:document", text))
    }
}
