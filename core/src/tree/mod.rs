//! Arena-backed concrete syntax tree.
//!
//! Every node is either a grammar rule or a terminal pointing into the token
//! stream the tree was parsed from. Children are ordered; parents are plain
//! `NodeId` back-links used for ancestor walks.

mod rule;


pub use rule::Rule;

use serde::Serialize;

use crate::token::{Span, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Rule(Rule),
    /// Terminal; holds the token's stream index.
    Token(usize),
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    tokens: Vec<Token>,
}

impl SyntaxTree {
    pub(crate) fn from_parts(nodes: Vec<NodeData>, tokens: Vec<Token>) -> Self {
        Self { nodes, tokens }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The full token stream, hidden and marker tokens included.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    pub fn rule(&self, id: NodeId) -> Option<Rule> {
        match self.kind(id) {
            NodeKind::Rule(rule) => Some(rule),
            NodeKind::Token(_) => None,
        }
    }

    pub fn token(&self, id: NodeId) -> Option<&Token> {
        match self.kind(id) {
            NodeKind::Token(index) => self.tokens.get(index),
            NodeKind::Rule(_) => None,
        }
    }

    pub fn token_kind(&self, id: NodeId) -> Option<TokenKind> {
        self.token(id).map(|t| t.kind)
    }

    pub fn is_terminal(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Token(_))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.nodes[id.index()].span
    }

    /// `id` followed by its parents up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |n| self.parent(*n))
    }

    /// Nearest ancestor (or self) produced by `rule`.
    pub fn enclosing(&self, id: NodeId, rule: Rule) -> Option<NodeId> {
        self.ancestors(id).find(|n| self.rule(*n) == Some(rule))
    }

    pub fn child_rule(&self, id: NodeId, rule: Rule) -> Option<NodeId> {
        self.children(id).iter().copied().find(|c| self.rule(*c) == Some(rule))
    }

    pub fn child_token(&self, id: NodeId, kind: TokenKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.token_kind(*c) == Some(kind))
    }

    /// Pre-order walk of the subtree rooted at `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Terminal nodes of the subtree in source order.
    pub fn terminals(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.is_terminal(*n))
            .collect()
    }

    pub fn first_terminal(&self, id: NodeId) -> Option<NodeId> {
        self.terminals(id).into_iter().next()
    }

    /// Concatenated text of the subtree's terminals (trivia excluded).
    pub fn text(&self, id: NodeId) -> String {
        self.terminals(id)
            .into_iter()
            .filter_map(|t| self.token(t))
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Indented dump of the tree, one node per line.
    pub fn to_debug_string(&self) -> String {
        let mut out = String::new();
        self.write_debug(self.root(), 0, &mut out);
        out
    }

    fn write_debug(&self, id: NodeId, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        match self.kind(id) {
            NodeKind::Rule(rule) => out.push_str(rule.name()),
            NodeKind::Token(index) => {
                let token = &self.tokens[index];
                out.push_str(&format!("{:?} {:?}", token.kind, token.text));
            }
        }
        out.push('\n');
        for child in self.children(id) {
            self.write_debug(*child, depth + 1, out);
        }
    }
}

/// Incremental tree construction used by the parser.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn push(&mut self, kind: NodeKind, span: Option<Span>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = self.open.last().copied();
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
            span,
        });
        if let Some(p) = parent {
            self.nodes[p.index()].children.push(id);
        }
        id
    }

    pub(crate) fn start(&mut self, rule: Rule) {
        let id = self.push(NodeKind::Rule(rule), None);
        self.open.push(id);
    }

    pub(crate) fn token(&mut self, stream_index: usize, span: Span) {
        self.push(NodeKind::Token(stream_index), Some(span));
    }

    /// Open a `rule` node that adopts the most recently completed child of
    /// the current node, for left-associative constructs.
    pub(crate) fn wrap_last(&mut self, rule: Rule) {
        let Some(parent) = self.open.last().copied() else {
            self.start(rule);
            return;
        };
        let Some(last) = self.nodes[parent.index()].children.pop() else {
            self.start(rule);
            return;
        };
        let id = self.push(NodeKind::Rule(rule), None);
        self.nodes[last.index()].parent = Some(id);
        self.nodes[id.index()].children.push(last);
        self.open.push(id);
    }

    pub(crate) fn finish(&mut self) {
        let Some(id) = self.open.pop() else {
            return;
        };
        let span = self.nodes[id.index()]
            .children
            .iter()
            .filter_map(|c| self.nodes[c.index()].span)
            .reduce(|acc, s| acc.cover(&s));
        self.nodes[id.index()].span = span;
    }

    /// Close any nodes left open and give the root the whole-document span.
    pub(crate) fn build(mut self, root_span: Span) -> Vec<NodeData> {
        while !self.open.is_empty() {
            self.finish();
        }
        if let Some(root) = self.nodes.first_mut() {
            root.span = Some(root_span);
        }
        self.nodes
    }
}
