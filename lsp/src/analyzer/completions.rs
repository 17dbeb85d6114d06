//! Completion items for a caret: grammar candidates merged with bindings in
//! scope, the built-in vocabulary and known namespaces.

use std::collections::HashSet;

use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind};
use xule_core::{
    predict::{CandidateSet, collect_candidates},
    token::TokenKind,
    tree::{NodeId, Rule, SyntaxTree},
    vocab::{VocabKind, Vocabulary},
};

use super::{
    DocumentState,
    position::{self, NodeInfo},
    symbols::{BindingKind, EnvId},
    unit::NodeRef,
    utils::is_subsequence,
};

struct Request<'a> {
    state: &'a DocumentState,
    vocab: &'a Vocabulary,
    candidates: CandidateSet,
    prefix: String,
    env: EnvId,
    ref_index: usize,
    items: Vec<CompletionItem>,
    seen: HashSet<String>,
}

/// Completion items at the 1-based (line, column) of the primary file.
pub fn complete(state: &DocumentState, vocab: &Vocabulary, line: u32, column: u32) -> Vec<CompletionItem> {
    let tree = &state.unit.primary().tree;
    let Some(info) = position::resolve(tree, line, column) else {
        return Vec::new();
    };
    let candidates = collect_candidates(tree.tokens(), info.token_index);
    let anchor = scope_anchor(tree, line, column);
    let mut request = Request {
        state,
        vocab,
        candidates,
        prefix: typed_prefix(tree, &info),
        env: state.symbols.governing_env(tree, NodeRef::new(0, anchor)),
        ref_index: info.token_index,
        items: Vec::new(),
        seen: HashSet::new(),
    };
    tracing::trace!(
        token_index = info.token_index,
        prefix = %request.prefix,
        rules = ?request.candidates.rules,
        "completion request"
    );
    request.run(tree, &info);
    request.items
}

impl Request<'_> {
    fn has_rule(&self, rule: Rule) -> bool {
        self.candidates.rules.contains(&rule)
    }

    fn run(&mut self, tree: &SyntaxTree, info: &NodeInfo) {
        if self.has_rule(Rule::PropertyRef) {
            let names = self.vocab_names(VocabKind::Property);
            self.add_group(names, CompletionItemKind::PROPERTY);
            return;
        }

        let mut consumed = false;

        if self.has_rule(Rule::BooleanLiteral) {
            let names = vec![("true".to_string(), None), ("false".to_string(), None)];
            self.add_group(names, CompletionItemKind::KEYWORD);
        }

        if self.has_rule(Rule::NavigationDirection) {
            let names = self.vocab_names(VocabKind::NavigationDirection);
            self.add_group(names, CompletionItemKind::ENUM_MEMBER);
            consumed = true;
        }
        if self.has_rule(Rule::ReturnOption) {
            let names = self.vocab_names(VocabKind::ReturnOption);
            self.add_group(names, CompletionItemKind::ENUM_MEMBER);
            consumed = true;
        }
        if self.has_rule(Rule::OutputAttributeName) {
            let mut names = self.vocab_names(VocabKind::OutputAttribute);
            names.extend(self.bindings(BindingKind::OutputAttribute));
            self.add_group(names, CompletionItemKind::PROPERTY);
            consumed = true;
        }

        if self.has_rule(Rule::AssignedVariable) {
            let names = self.bindings(BindingKind::Variable);
            self.add_group(names, CompletionItemKind::VARIABLE);
        }

        let mut qualified_done = false;
        if self.has_rule(Rule::QualifiedName) {
            qualified_done = true;
            match typed_namespace_prefix(tree, info.node) {
                Some(prefix) => {
                    let names = self
                        .state
                        .namespaces
                        .names_for(&prefix)
                        .into_iter()
                        .map(|n| (n.to_string(), Some(prefix.clone())))
                        .collect();
                    self.add_group(names, CompletionItemKind::ENUM_MEMBER);
                    consumed = true;
                }
                None => self.add_prefixes(),
            }
        }

        if self.has_rule(Rule::VariableRead) {
            let constants = self.bindings(BindingKind::Constant);
            self.add_group(constants, CompletionItemKind::CONSTANT);
            let variables = self.bindings(BindingKind::Variable);
            self.add_group(variables, CompletionItemKind::VARIABLE);
            let builtins = self
                .vocab
                .names(VocabKind::Function)
                .iter()
                .map(|n| (n.clone(), self.vocab.signature(n).map(str::to_string)))
                .collect();
            self.add_group(builtins, CompletionItemKind::FUNCTION);
            let functions = self.bindings(BindingKind::Function);
            self.add_group(functions, CompletionItemKind::FUNCTION);
            if !qualified_done {
                self.add_prefixes();
            }
            let literals = self.vocab_names(VocabKind::KeywordLiteral);
            self.add_group(literals, CompletionItemKind::KEYWORD);
        }

        if !consumed {
            let keywords = self
                .candidates
                .tokens
                .iter()
                .filter_map(|k| k.keyword_text())
                .map(|k| (k.to_string(), None))
                .collect();
            self.add_group(keywords, CompletionItemKind::KEYWORD);
        }
    }

    fn vocab_names(&self, kind: VocabKind) -> Vec<(String, Option<String>)> {
        self.vocab.names(kind).iter().map(|n| (n.clone(), None)).collect()
    }

    fn bindings(&self, kind: BindingKind) -> Vec<(String, Option<String>)> {
        self.state
            .symbols
            .visible_bindings(self.env, 0, self.ref_index, kind)
            .into_iter()
            .map(|b| {
                let origin = self.state.unit.origin_of(b.declared_at).filter(|_| b.declared_at.file != 0);
                (b.name.clone(), origin.map(str::to_string))
            })
            .collect()
    }

    fn add_prefixes(&mut self) {
        let prefixes = self
            .state
            .namespaces
            .prefixes()
            .into_iter()
            .map(|p| (p.to_string(), None))
            .collect();
        self.add_group(prefixes, CompletionItemKind::ENUM);
    }

    /// Filter one group against the typed prefix, rank it and append labels
    /// not seen yet.
    fn add_group(&mut self, names: Vec<(String, Option<String>)>, kind: CompletionItemKind) {
        for (label, detail) in rank(&self.prefix, names) {
            if !self.seen.insert(label.clone()) {
                continue;
            }
            self.items.push(CompletionItem {
                label,
                kind: Some(kind),
                detail,
                ..Default::default()
            });
        }
    }
}

/// Keep everything for an empty prefix; otherwise keep subsequence matches
/// ordered by Jaro-Winkler similarity, ties keeping their input order.
fn rank(prefix: &str, names: Vec<(String, Option<String>)>) -> Vec<(String, Option<String>)> {
    if prefix.is_empty() {
        return names;
    }
    let needle = prefix.to_lowercase();
    let mut scored: Vec<(f64, (String, Option<String>))> = names
        .into_iter()
        .filter(|(label, _)| is_subsequence(&needle, label))
        .map(|entry| (strsim::jaro_winkler(&needle, &entry.0.to_lowercase()), entry))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, entry)| entry).collect()
}

/// Text of the identifier under the caret up to the caret.
fn typed_prefix(tree: &SyntaxTree, info: &NodeInfo) -> String {
    let Some(token) = tree.token(info.node) else {
        return String::new();
    };
    if !token.kind.is_identifier_like() || token.index != info.token_index {
        return String::new();
    }
    token.text.chars().take(info.offset).collect()
}

/// Namespace prefix already typed before a `:` in the qualified name the
/// caret sits in.
fn typed_namespace_prefix(tree: &SyntaxTree, node: NodeId) -> Option<String> {
    let parent = tree.parent(node)?;
    if tree.rule(parent) != Some(Rule::QualifiedName) {
        return None;
    }
    let colon = tree.child_token(parent, TokenKind::Colon)?;
    if node < colon {
        return None;
    }
    let first = tree.first_terminal(parent)?;
    Some(tree.text(first))
}

/// Node whose scope governs the caret: the last token starting before it.
fn scope_anchor(tree: &SyntaxTree, line: u32, column: u32) -> NodeId {
    tree.terminals(tree.root())
        .into_iter()
        .rev()
        .find(|t| {
            tree.token(*t).is_some_and(|tok| {
                tok.kind != TokenKind::Eof && (tok.span.start.line, tok.span.start.column) < (line, column)
            })
        })
        .unwrap_or_else(|| tree.root())
}
