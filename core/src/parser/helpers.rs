use super::{MAX_EXPR_DEPTH, Parser};
use crate::{
    token::{ParseError, Position, Span, Token, TokenKind},
    tree::Rule,
};

impl<'a> Parser<'a> {
    pub(super) fn current(&self) -> Option<&Token> {
        let idx = (*self.visible.get(self.pos).or(self.visible.last())?).min(self.tokens.len() - 1);
        self.tokens.get(idx)
    }

    pub(super) fn kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    pub(super) fn nth(&self, n: usize) -> Option<&Token> {
        let idx = *self.visible.get(self.pos + n)?;
        self.tokens.get(idx)
    }

    pub(super) fn nth_kind(&self, n: usize) -> TokenKind {
        self.nth(n).map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    pub(super) fn current_span(&self) -> Span {
        self.current()
            .map(|t| t.span)
            .unwrap_or_else(|| Span::single(Position::start()))
    }

    fn at_caret(&self) -> bool {
        matches!(&self.probe, Some(p) if !p.done && p.caret == self.pos)
    }

    /// Note that `kind` is acceptable here when probing at the caret.
    fn record(&mut self, kind: Option<TokenKind>) {
        if !self.at_caret() {
            return;
        }
        let stack = self.rule_stack.clone();
        if let Some(probe) = self.probe.as_mut() {
            if let Some(kind) = kind.filter(|k| !k.is_punctuation()) {
                probe.candidates.tokens.insert(kind);
            }
            probe.candidates.rules.extend(stack);
        }
    }

    /// Announce the rules that may start at the current position.
    pub(super) fn predict(&mut self, rules: &[Rule]) {
        if !self.at_caret() {
            return;
        }
        self.record(None);
        if let Some(probe) = self.probe.as_mut() {
            probe.candidates.rules.extend(rules.iter().copied());
        }
    }

    pub(super) fn at(&mut self, kind: TokenKind) -> bool {
        self.record(Some(kind));
        self.kind() == kind
    }

    pub(super) fn at_any(&mut self, kinds: &[TokenKind]) -> bool {
        let mut hit = false;
        for kind in kinds {
            hit |= self.at(*kind);
        }
        hit
    }

    /// Identifier, or a keyword used in a name position.
    pub(super) fn at_name(&mut self) -> bool {
        self.record(Some(TokenKind::Identifier));
        let kind = self.kind();
        kind == TokenKind::Identifier || kind.is_keyword()
    }

    /// Identifier spelled `word`; used for soft keywords.
    pub(super) fn at_word(&mut self, word: &str) -> bool {
        self.record(Some(TokenKind::Identifier));
        matches!(self.current(), Some(t) if t.kind == TokenKind::Identifier && t.text == word)
    }

    pub(super) fn nth_is_word(&self, n: usize, word: &str) -> bool {
        matches!(self.nth(n), Some(t) if t.kind == TokenKind::Identifier && t.text == word)
    }

    /// Attach the current token to the open node and advance. EOF is only
    /// attached, never stepped past.
    pub(super) fn bump(&mut self) {
        let Some(token) = self.current() else {
            return;
        };
        let (index, span, kind) = (token.index, token.span, token.kind);
        self.builder.token(index, span);
        if let Some(probe) = self.probe.as_mut() {
            if probe.caret <= self.pos {
                probe.done = true;
            }
        }
        if kind != TokenKind::Eof {
            self.pos += 1;
        }
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        let found = self.kind().describe();
        self.error_here(format!("Expected {}, found {}", kind.describe(), found));
        false
    }

    /// Report at the current token. Consecutive reports at one token collapse
    /// into the first.
    pub(super) fn error_here(&mut self, message: String) {
        let span = self.current_span();
        if let Some(probe) = self.probe.as_mut() {
            if self.pos >= probe.caret {
                probe.done = true;
            }
        }
        let duplicate = self
            .errors
            .last()
            .and_then(|e| e.span)
            .is_some_and(|s| s.start.offset == span.start.offset);
        if !duplicate {
            self.errors.push(ParseError::with_span(message, span));
        }
    }

    pub(super) fn start(&mut self, rule: Rule) {
        self.rule_stack.push(rule);
        self.builder.start(rule);
        self.record(None);
    }

    /// Open `rule` around the last completed child (left-associative operators).
    pub(super) fn wrap(&mut self, rule: Rule) {
        self.rule_stack.push(rule);
        self.builder.wrap_last(rule);
        self.record(None);
    }

    pub(super) fn finish(&mut self) {
        self.rule_stack.pop();
        self.builder.finish();
    }

    /// Skip tokens into an `error` node until one of `sync` or EOF.
    pub(super) fn recover_until(&mut self, sync: &[TokenKind]) {
        self.start(Rule::Error);
        loop {
            let kind = self.kind();
            if kind == TokenKind::Eof || sync.contains(&kind) {
                break;
            }
            self.bump();
        }
        self.finish();
    }

    /// Track expression nesting; false (with an error reported and a token
    /// consumed) once the limit is hit.
    pub(super) fn enter(&mut self) -> bool {
        if self.depth >= MAX_EXPR_DEPTH {
            self.error_here("Expression nested too deeply".to_string());
            if self.kind() != TokenKind::Eof {
                self.start(Rule::Error);
                self.bump();
                self.finish();
            }
            return false;
        }
        self.depth += 1;
        true
    }

    pub(super) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
