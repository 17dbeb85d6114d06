//! Lexical environments and the bindings recorded in them.
//!
//! Every scope-opening node of every file in a compilation unit is mapped to
//! an [`Environment`]; file roots share one global environment so that
//! declarations from auto-imported files are visible to the edited document.
//! References find their environment by walking up the tree to the nearest
//! mapped ancestor and then follow the parent chain outwards.

use serde::Serialize;
use xule_core::{
    token::TokenKind,
    tree::{NodeId, Rule, SyntaxTree},
    util::fast_map::{FastHashMap, fast_hash_map_new},
};

use super::unit::{CompilationUnit, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingKind {
    Constant,
    Function,
    Variable,
    OutputAttribute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Terminal naming the declaration, or the first terminal of the
    /// construct for implicit bindings.
    pub declared_at: NodeRef,
    /// Stream index of the first token that can see this binding.
    pub visible_from: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvId(pub usize);

pub const GLOBAL_ENV: EnvId = EnvId(0);

#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub bindings: Vec<Binding>,
    pub parent: Option<EnvId>,
    /// Node that opened the scope; `None` for the global environment.
    pub owner: Option<NodeRef>,
}

/// Variables bound by a construct without an explicit declaration.
const IMPLICIT_VARIABLES: &[(Rule, &str)] = &[
    (Rule::Navigation, "$relationship"),
    (Rule::Factset, "$fact"),
    (Rule::FilterExpression, "$item"),
    (Rule::AssertDeclaration, "$rule-value"),
    (Rule::OutputDeclaration, "$rule-value"),
];

fn opens_scope(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::FunctionDeclaration
            | Rule::AssertDeclaration
            | Rule::OutputDeclaration
            | Rule::ExpressionBlock
            | Rule::ForExpression
            | Rule::Navigation
            | Rule::Factset
            | Rule::FilterExpression
            | Rule::ArgumentList
    )
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    envs: Vec<Environment>,
    scopes: FastHashMap<NodeRef, EnvId>,
}

impl SymbolTable {
    pub fn build(unit: &CompilationUnit) -> Self {
        let mut table = Self {
            envs: vec![Environment::default()],
            scopes: fast_hash_map_new(),
        };
        for (index, file) in unit.files().iter().enumerate() {
            let tree = &file.tree;
            if tree.is_empty() {
                continue;
            }
            let mut builder = Builder {
                table: &mut table,
                tree,
                file: index,
            };
            builder.table.scopes.insert(NodeRef::new(index, tree.root()), GLOBAL_ENV);
            builder.walk_children(tree.root(), GLOBAL_ENV);
        }
        tracing::trace!(
            envs = table.envs.len(),
            scopes = table.scopes.len(),
            "built symbol table"
        );
        table
    }

    pub fn env(&self, id: EnvId) -> &Environment {
        &self.envs[id.0]
    }

    pub fn env_count(&self) -> usize {
        self.envs.len()
    }

    pub fn global(&self) -> &Environment {
        self.env(GLOBAL_ENV)
    }

    /// Environment opened by `node`, if it opens one.
    pub fn scope_of(&self, node: NodeRef) -> Option<EnvId> {
        self.scopes.get(&node).copied()
    }

    /// The environment governing `node`: the one opened by its nearest
    /// mapped ancestor (the node itself included).
    pub fn governing_env(&self, tree: &SyntaxTree, node: NodeRef) -> EnvId {
        tree.ancestors(node.node)
            .find_map(|n| self.scope_of(NodeRef::new(node.file, n)))
            .unwrap_or(GLOBAL_ENV)
    }

    /// Resolve `name` as seen from the reference node `at`.
    pub fn lookup(&self, unit: &CompilationUnit, at: NodeRef, name: &str, kind: BindingKind) -> Option<&Binding> {
        let tree = &unit.file(at.file)?.tree;
        let env = self.governing_env(tree, at);
        let ref_index = reference_index(tree, at.node);
        self.lookup_from(env, at.file, ref_index, name, kind)
    }

    /// Chain search starting at `env`. Within one environment the most recent
    /// visible declaration wins.
    pub fn lookup_from(
        &self,
        env: EnvId,
        file: usize,
        ref_index: usize,
        name: &str,
        kind: BindingKind,
    ) -> Option<&Binding> {
        let mut current = Some(env);
        while let Some(id) = current {
            let environment = self.env(id);
            let found = environment
                .bindings
                .iter()
                .rev()
                .find(|b| b.kind == kind && b.name == name && self.is_visible(id, b, file, ref_index));
            if found.is_some() {
                return found;
            }
            current = environment.parent;
        }
        None
    }

    /// Every binding of `kind` visible from `env`, innermost first, one per
    /// name.
    pub fn visible_bindings(&self, env: EnvId, file: usize, ref_index: usize, kind: BindingKind) -> Vec<&Binding> {
        let mut out: Vec<&Binding> = Vec::new();
        let mut current = Some(env);
        while let Some(id) = current {
            let environment = self.env(id);
            for binding in environment.bindings.iter().rev() {
                if binding.kind == kind
                    && self.is_visible(id, binding, file, ref_index)
                    && !out.iter().any(|b| b.name == binding.name)
                {
                    out.push(binding);
                }
            }
            current = environment.parent;
        }
        out
    }

    /// Binding whose declaration site is exactly `node`.
    pub fn declared_at(&self, node: NodeRef) -> Option<&Binding> {
        self.envs
            .iter()
            .flat_map(|e| e.bindings.iter())
            .find(|b| b.declared_at == node)
    }

    fn is_visible(&self, env: EnvId, binding: &Binding, file: usize, ref_index: usize) -> bool {
        env == GLOBAL_ENV || (binding.declared_at.file == file && binding.visible_from <= ref_index)
    }
}

/// Stream index a reference is checked at: its first token.
pub fn reference_index(tree: &SyntaxTree, node: NodeId) -> usize {
    tree.first_terminal(node)
        .and_then(|t| tree.token(t))
        .map(|t| t.index)
        .unwrap_or(0)
}

struct Builder<'a> {
    table: &'a mut SymbolTable,
    tree: &'a SyntaxTree,
    file: usize,
}

impl Builder<'_> {
    fn walk_children(&mut self, node: NodeId, scope: EnvId) {
        for &child in self.tree.children(node) {
            self.visit(child, scope);
        }
    }

    /// Record declarations found at `node` into `scope`, then descend. Nodes
    /// that open a scope descend with their own environment.
    fn visit(&mut self, node: NodeId, scope: EnvId) {
        let Some(rule) = self.tree.rule(node) else {
            return;
        };

        match rule {
            Rule::FunctionDeclaration => {
                self.declare_child(node, TokenKind::Identifier, BindingKind::Function, scope);
            }
            Rule::ConstantDeclaration => {
                self.declare_child(node, TokenKind::Variable, BindingKind::Constant, scope);
            }
            Rule::OutputAttributeDeclaration => {
                self.declare_child(node, TokenKind::Identifier, BindingKind::OutputAttribute, scope);
            }
            Rule::FunctionArgument | Rule::ForVariable | Rule::BindAs => {
                self.declare_child(node, TokenKind::Variable, BindingKind::Variable, scope);
            }
            Rule::AssignedVariable => self.declare_assignment(node, scope),
            _ => {}
        }

        // an assertion's top-level block shares the assertion's scope so
        // its assignments reach the output attributes
        let shares_parent_scope = rule == Rule::ExpressionBlock
            && self
                .tree
                .parent(node)
                .and_then(|p| self.tree.rule(p))
                .is_some_and(|r| matches!(r, Rule::AssertDeclaration | Rule::OutputDeclaration));

        if opens_scope(rule) && !shares_parent_scope {
            let env = self.open(node, scope);
            if let Some((_, name)) = IMPLICIT_VARIABLES.iter().find(|(r, _)| *r == rule) {
                self.declare_implicit(node, name, env);
            }
            self.walk_children(node, env);
        } else {
            self.walk_children(node, scope);
        }
    }

    fn open(&mut self, owner: NodeId, parent: EnvId) -> EnvId {
        let id = EnvId(self.table.envs.len());
        let owner = NodeRef::new(self.file, owner);
        self.table.envs.push(Environment {
            bindings: Vec::new(),
            parent: Some(parent),
            owner: Some(owner),
        });
        self.table.scopes.insert(owner, id);
        id
    }

    fn declare(&mut self, scope: EnvId, name: String, kind: BindingKind, at: NodeId, visible_from: usize) {
        self.table.envs[scope.0].bindings.push(Binding {
            name,
            kind,
            declared_at: NodeRef::new(self.file, at),
            visible_from,
        });
    }

    fn declare_child(&mut self, node: NodeId, token: TokenKind, kind: BindingKind, scope: EnvId) {
        let Some(name_node) = self.tree.child_token(node, token) else {
            return;
        };
        let Some(tok) = self.tree.token(name_node) else {
            return;
        };
        let (name, index) = (tok.text.clone(), tok.index);
        self.declare(scope, name, kind, name_node, index);
    }

    /// `$x = value;` makes `$x` visible after the terminating `;`, or after
    /// the assignment's last token when the `;` is missing.
    fn declare_assignment(&mut self, node: NodeId, scope: EnvId) {
        let Some(name_node) = self.tree.child_token(node, TokenKind::Variable) else {
            return;
        };
        let Some(name) = self.tree.token(name_node).map(|t| t.text.clone()) else {
            return;
        };
        let assignment = self.tree.parent(node).unwrap_or(node);
        let visible_from = match self.tree.child_token(assignment, TokenKind::Semicolon) {
            Some(semi) => self.tree.token(semi).map(|t| t.index + 1),
            None => self
                .tree
                .terminals(assignment)
                .last()
                .and_then(|t| self.tree.token(*t))
                .map(|t| t.index + 1),
        }
        .unwrap_or(usize::MAX);
        self.declare(scope, name, BindingKind::Variable, name_node, visible_from);
    }

    fn declare_implicit(&mut self, node: NodeId, name: &str, env: EnvId) {
        let Some(first) = self.tree.first_terminal(node) else {
            return;
        };
        let index = self.tree.token(first).map(|t| t.index).unwrap_or(0);
        self.declare(env, name.to_string(), BindingKind::Variable, first, index);
    }
}
