//! Recursive-descent XULE parser producing a [`SyntaxTree`].
//!
//! The parser never aborts: syntax errors are collected, the offending
//! tokens are wrapped in `error` nodes and parsing resumes at the next
//! declaration keyword. The same code path drives completion prediction
//! (see [`crate::predict`]) by running in probe mode.

use std::collections::BTreeSet;

use crate::{
    token::{LexError, ParseError, Position, Span, Token, TokenKind, tokenize},
    tree::{Rule, SyntaxTree, TreeBuilder},
};

mod declarations;
mod expr;
mod helpers;
mod query;

#[cfg(test)]
mod recover_test;

/// Deepest expression nesting before the parser reports an error instead
/// of recursing further.
pub const MAX_EXPR_DEPTH: usize = 128;

#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub tree: SyntaxTree,
    pub errors: Vec<ParseError>,
}

/// What the parser would accept at the caret, gathered in probe mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    pub tokens: BTreeSet<TokenKind>,
    pub rules: BTreeSet<Rule>,
}

#[derive(Debug)]
pub(crate) struct Probe {
    /// Index into the visible-token list of the first token at/after the caret.
    caret: usize,
    done: bool,
    candidates: CandidateSet,
}

pub struct Parser<'a> {
    pub(crate) tokens: &'a [Token],
    /// Stream indices of parser-visible tokens; the last one is EOF.
    pub(crate) visible: Vec<usize>,
    pub(crate) pos: usize,
    pub(crate) builder: TreeBuilder,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) rule_stack: Vec<Rule>,
    pub(crate) depth: usize,
    pub(crate) probe: Option<Probe>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let visible = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_visible())
            .map(|(i, _)| i)
            .collect();
        Self {
            tokens,
            visible,
            pos: 0,
            builder: TreeBuilder::default(),
            errors: Vec::new(),
            rule_stack: Vec::new(),
            depth: 0,
            probe: None,
        }
    }

    /// Parser that records candidates for the caret at `caret_index` (a
    /// stream index) instead of only building a tree.
    pub(crate) fn probing(tokens: &'a [Token], caret_index: usize) -> Self {
        let mut parser = Self::new(tokens);
        let caret = parser
            .visible
            .iter()
            .position(|&i| i >= caret_index)
            .unwrap_or(parser.visible.len().saturating_sub(1));
        parser.probe = Some(Probe {
            caret,
            done: false,
            candidates: CandidateSet::default(),
        });
        parser
    }

    pub(crate) fn into_candidates(self) -> CandidateSet {
        self.probe.map(|p| p.candidates).unwrap_or_default()
    }

    fn root_span(&self) -> Span {
        let end = self
            .tokens
            .last()
            .map(|t| t.span.end)
            .unwrap_or_else(Position::start);
        Span::new(Position::start(), end)
    }
}

/// Parse an already tokenized document. `tokens` must end with EOF.
pub fn parse(tokens: Vec<Token>) -> ParseOutput {
    let (nodes, errors) = {
        let mut parser = Parser::new(&tokens);
        parser.parse_file();
        let root_span = parser.root_span();
        let Parser { builder, errors, .. } = parser;
        (builder.build(root_span), errors)
    };
    tracing::trace!(nodes = nodes.len(), errors = errors.len(), "parsed xule document");
    ParseOutput {
        tree: SyntaxTree::from_parts(nodes, tokens),
        errors,
    }
}

/// Lex and parse `input`; lexer syntax errors are merged with parser errors.
pub fn parse_source(input: &str) -> Result<ParseOutput, LexError> {
    let lexed = tokenize(input)?;
    let mut out = parse(lexed.tokens);
    out.errors = merge_errors(lexed.errors, std::mem::take(&mut out.errors));
    Ok(out)
}

/// Combine lexer and parser errors sorted by position. A parser error on a
/// span the lexer already reported (a stray `}`) is dropped.
pub fn merge_errors(lex_errors: Vec<ParseError>, parse_errors: Vec<ParseError>) -> Vec<ParseError> {
    let reported: Vec<Span> = lex_errors.iter().filter_map(|e| e.span).collect();
    let mut errors = lex_errors;
    errors.extend(
        parse_errors
            .into_iter()
            .filter(|e| e.span.is_none_or(|span| !reported.contains(&span))),
    );
    errors.sort_by_key(|e| e.span.map(|s| s.start.offset).unwrap_or(0));
    errors
}
