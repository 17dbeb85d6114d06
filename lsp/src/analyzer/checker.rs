use ropey::Rope;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};
use xule_core::{
    token::ParseError,
    tree::{NodeId, Rule, SyntaxTree},
    vocab::Vocabulary,
};

use super::{
    CheckSettings,
    symbols::{BindingKind, SymbolTable},
    unit::{CompilationUnit, NodeRef},
    utils::span_to_range,
};

pub const DIAGNOSTIC_SOURCE: &str = "xule";

/// Syntax errors of the primary file followed by unresolved references
/// found in it. Imported files are never reported on.
pub fn check(
    unit: &CompilationUnit,
    symbols: &SymbolTable,
    vocab: &Vocabulary,
    settings: &CheckSettings,
) -> Vec<Diagnostic> {
    let primary = unit.primary();
    let mut checker = Checker {
        unit,
        symbols,
        vocab,
        settings,
        tree: &primary.tree,
        text: &primary.text,
        diagnostics: Vec::new(),
    };
    for error in &primary.errors {
        checker.syntax_error(error);
    }
    if !primary.tree.is_empty() {
        for node in primary.tree.descendants(primary.tree.root()) {
            checker.visit(node);
        }
    }
    checker.diagnostics
}

struct Checker<'a> {
    unit: &'a CompilationUnit,
    symbols: &'a SymbolTable,
    vocab: &'a Vocabulary,
    settings: &'a CheckSettings,
    tree: &'a SyntaxTree,
    text: &'a Rope,
    diagnostics: Vec<Diagnostic>,
}

impl Checker<'_> {
    fn visit(&mut self, node: NodeId) {
        match self.tree.rule(node) {
            Some(Rule::CallExpression) if self.settings.functions => self.check_call(node),
            Some(Rule::PropertyRef) if self.settings.properties => self.check_property(node),
            Some(Rule::OutputAttributeName) if self.settings.properties => self.check_output_attribute(node),
            Some(Rule::VariableRead) if self.settings.variables => self.check_variable(node),
            _ => {}
        }
    }

    /// Only bare callees are checked; `prefix:name(...)` calls are left alone.
    fn check_call(&mut self, node: NodeId) {
        let Some(callee) = self.tree.child_rule(node, Rule::FunctionRef) else {
            return;
        };
        let Some(name) = self.name_of(callee) else {
            return;
        };
        if self.vocab.is_function(&name) || self.resolves(callee, &name, &[BindingKind::Function]) {
            return;
        }
        self.report(callee, format!("Unknown function '{name}'"), "unknown-function");
    }

    fn check_property(&mut self, node: NodeId) {
        let Some(name) = self.name_of(node) else {
            return;
        };
        if !self.vocab.is_property(&name) {
            self.report(node, format!("Unknown property '{name}'"), "unknown-property");
        }
    }

    fn check_output_attribute(&mut self, node: NodeId) {
        let Some(name) = self.name_of(node) else {
            return;
        };
        if self.vocab.is_output_attribute(&name) || self.resolves(node, &name, &[BindingKind::OutputAttribute]) {
            return;
        }
        self.report(
            node,
            format!("Unknown output attribute '{name}'"),
            "unknown-output-attribute",
        );
    }

    fn check_variable(&mut self, node: NodeId) {
        let Some(name) = self.name_of(node) else {
            return;
        };
        if !self.resolves(node, &name, &[BindingKind::Variable, BindingKind::Constant]) {
            self.report(node, format!("Unknown variable '{name}'"), "unknown-variable");
        }
    }

    /// Text of the node's single name token; absent for error-recovered nodes.
    fn name_of(&self, node: NodeId) -> Option<String> {
        let terminal = self.tree.first_terminal(node)?;
        let token = self.tree.token(terminal)?;
        token.kind.is_identifier_like().then(|| token.text.clone())
    }

    fn resolves(&self, node: NodeId, name: &str, kinds: &[BindingKind]) -> bool {
        let at = NodeRef::new(0, node);
        kinds
            .iter()
            .any(|kind| self.symbols.lookup(self.unit, at, name, *kind).is_some())
    }

    fn report(&mut self, node: NodeId, message: String, code: &str) {
        let Some(span) = self.tree.span(node) else {
            return;
        };
        self.diagnostics.push(Diagnostic {
            range: span_to_range(self.text, &span),
            severity: Some(DiagnosticSeverity::ERROR),
            code: Some(NumberOrString::String(code.to_string())),
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message,
            ..Default::default()
        });
    }

    fn syntax_error(&mut self, error: &ParseError) {
        let range = match &error.span {
            Some(span) => span_to_range(self.text, span),
            None => Range::new(Position::new(0, 0), Position::new(0, 0)),
        };
        self.diagnostics.push(Diagnostic {
            range,
            severity: Some(DiagnosticSeverity::ERROR),
            code: Some(NumberOrString::String("syntax-error".to_string())),
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: error.message.clone(),
            ..Default::default()
        });
    }
}
