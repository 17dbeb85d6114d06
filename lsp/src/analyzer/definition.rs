use tower_lsp::lsp_types::Range;
use xule_core::{
    token::TokenKind,
    tree::{NodeId, SyntaxTree},
};

use super::{
    DocumentState,
    position,
    symbols::BindingKind,
    unit::NodeRef,
    utils::span_to_range,
};

/// Where a name is declared: the declaring file's origin and the range of
/// the declaring token in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionTarget {
    pub origin: String,
    pub range: Range,
}

const LOOKUP_ORDER: [BindingKind; 4] = [
    BindingKind::Constant,
    BindingKind::Function,
    BindingKind::Variable,
    BindingKind::OutputAttribute,
];

pub fn find_definition(state: &DocumentState, line: u32, column: u32) -> Option<DefinitionTarget> {
    let unit = &state.unit;
    let tree = &unit.primary().tree;
    let info = position::resolve(tree, line, column)?;
    let node = if tree.token(info.node).is_some_and(|t| is_name(t.kind)) {
        info.node
    } else {
        // `f(|$c)`: the caret touches the end of the punctuation first.
        name_starting_at(tree, line, column)?
    };
    let token = tree.token(node)?;
    let at = NodeRef::new(0, node);
    let binding = state.symbols.declared_at(at).or_else(|| {
        LOOKUP_ORDER
            .iter()
            .find_map(|kind| state.symbols.lookup(unit, at, &token.text, *kind))
    })?;

    let origin = unit.origin_of(binding.declared_at)?;
    let file = unit.file(binding.declared_at.file)?;
    let span = file.tree.span(binding.declared_at.node)?;
    Some(DefinitionTarget {
        origin: origin.to_string(),
        range: span_to_range(&file.text, &span),
    })
}

fn is_name(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Identifier | TokenKind::Variable)
}

fn name_starting_at(tree: &SyntaxTree, line: u32, column: u32) -> Option<NodeId> {
    tree.terminals(tree.root()).into_iter().find(|t| {
        tree.token(*t).is_some_and(|tok| {
            is_name(tok.kind) && tok.span.start.line == line && tok.span.start.column == column
        })
    })
}
