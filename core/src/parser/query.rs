use super::Parser;
use crate::{token::TokenKind, tree::Rule};

const FACTSET_OPTIONS: &[TokenKind] = &[
    TokenKind::Covered,
    TokenKind::CoveredDims,
    TokenKind::Nils,
    TokenKind::Nonils,
];

/// Soft keywords introducing a navigation clause followed by an expression.
const NAVIGATION_CLAUSE_WORDS: &[&str] = &["role", "drs-role", "taxonomy", "cube"];

/// Soft keywords that modify the shape of navigation results.
const RETURNS_MODIFIERS: &[&str] = &["list", "set", "paths"];

impl<'a> Parser<'a> {
    /// `{ options* @filters* [where block | block] }` or the `[...]` form.
    pub(super) fn parse_factset(&mut self) {
        self.start(Rule::Factset);
        let close = if self.kind() == TokenKind::LBracket {
            TokenKind::RBracket
        } else {
            TokenKind::RBrace
        };
        self.bump();

        while self.at_any(FACTSET_OPTIONS) {
            self.parse_leaf(Rule::FactsetOption);
        }
        while self.at(TokenKind::At) {
            self.parse_aspect_filter();
        }
        if self.at(TokenKind::Where) {
            self.parse_where();
        } else if !self.at(close) && self.kind() != TokenKind::Eof {
            self.parse_expression_block();
        }
        self.expect(close);
        self.finish();
    }

    /// `@[@]aspect[.prop]* [op value|*] [as $var]`
    fn parse_aspect_filter(&mut self) {
        self.start(Rule::AspectFilter);
        self.bump();
        self.eat(TokenKind::At);
        self.parse_qualified_name();
        while self.kind() == TokenKind::Dot {
            self.bump();
            self.start(Rule::PropertyRef);
            if self.at_name() {
                self.bump();
            } else {
                let found = self.kind().describe();
                self.error_here(format!("Expected property name, found {}", found));
            }
            self.finish();
        }

        let not_in = self.kind() == TokenKind::Not && self.nth_kind(1) == TokenKind::In;
        if self.at_any(&[TokenKind::Assign, TokenKind::Ne, TokenKind::In]) || not_in {
            if not_in {
                self.bump();
            }
            self.bump();
            self.start(Rule::AspectValue);
            if self.at(TokenKind::Mul) {
                self.bump();
            } else {
                self.parse_expression();
            }
            self.finish();
        }

        if self.at(TokenKind::As) {
            self.start(Rule::BindAs);
            self.bump();
            if self.at(TokenKind::Variable) {
                self.bump();
            } else {
                let found = self.kind().describe();
                self.error_here(format!("Expected variable after 'as', found {}", found));
            }
            self.finish();
        }
        self.finish();
    }

    fn parse_where(&mut self) {
        self.start(Rule::WhereClause);
        self.bump();
        self.parse_expression_block();
        self.finish();
    }

    /// `navigate [dimensions] [arcrole] direction [levels] [include start]
    ///  clauses* [returns ...]`
    pub(super) fn parse_navigation(&mut self) {
        self.start(Rule::Navigation);
        self.bump();
        self.eat(TokenKind::Dimensions);

        self.predict(&[Rule::NavigationArcrole, Rule::NavigationDirection]);
        let arcrole = match self.kind() {
            TokenKind::Identifier => self.nth_kind(1) == TokenKind::Identifier,
            TokenKind::Url | TokenKind::StringOpen => true,
            _ => false,
        };
        if arcrole {
            self.start(Rule::NavigationArcrole);
            if self.kind() == TokenKind::StringOpen {
                self.parse_string_literal();
            } else {
                self.bump();
            }
            self.finish();
        }

        self.start(Rule::NavigationDirection);
        self.predict(&[Rule::NavigationDirection]);
        if self.at(TokenKind::Identifier) {
            self.bump();
        } else {
            let found = self.kind().describe();
            self.error_here(format!("Expected navigation direction, found {}", found));
        }
        self.finish();

        self.eat(TokenKind::Number);
        if self.at(TokenKind::Include) {
            self.start(Rule::NavigationClause);
            self.bump();
            self.expect(TokenKind::Start);
            self.finish();
        }

        loop {
            if self.at_any(&[TokenKind::From, TokenKind::To]) {
                self.start(Rule::NavigationClause);
                self.bump();
                self.parse_expression();
                self.finish();
            } else if self.at(TokenKind::Stop) {
                self.start(Rule::NavigationClause);
                self.bump();
                if self.expect(TokenKind::When) {
                    self.parse_expression();
                }
                self.finish();
            } else if NAVIGATION_CLAUSE_WORDS.iter().any(|w| self.at_word(w)) {
                self.start(Rule::NavigationClause);
                self.bump();
                self.parse_expression();
                self.finish();
            } else if self.at(TokenKind::Where) {
                self.parse_where();
            } else {
                break;
            }
        }

        if self.at(TokenKind::Returns) {
            self.parse_returns();
        }
        self.finish();
    }

    /// `returns [by network] [list|set|paths]* (option | (option, ...)) [as NAME]`
    fn parse_returns(&mut self) {
        self.start(Rule::ReturnsClause);
        self.bump();
        loop {
            if self.kind() == TokenKind::Identifier && self.nth_is_word(0, "by") && self.nth_is_word(1, "network") {
                self.bump();
                self.bump();
            } else if RETURNS_MODIFIERS
                .iter()
                .any(|w| self.nth_is_word(0, w))
                && matches!(self.nth_kind(1), TokenKind::Identifier | TokenKind::LParen)
            {
                self.bump();
            } else {
                break;
            }
        }

        if self.eat(TokenKind::LParen) {
            loop {
                self.parse_return_option();
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen);
        } else {
            self.parse_return_option();
        }

        if self.at(TokenKind::As) {
            self.bump();
            if self.at(TokenKind::Identifier) {
                self.bump();
            } else {
                let found = self.kind().describe();
                self.error_here(format!("Expected result shape, found {}", found));
            }
        }
        self.finish();
    }

    fn parse_return_option(&mut self) {
        self.start(Rule::ReturnOption);
        self.predict(&[Rule::ReturnOption]);
        if self.at(TokenKind::Identifier) {
            self.bump();
        } else {
            let found = self.kind().describe();
            self.error_here(format!("Expected return option, found {}", found));
        }
        self.finish();
    }

    /// `filter expr [where block] [returns expr]`
    pub(super) fn parse_filter(&mut self) {
        self.start(Rule::FilterExpression);
        self.bump();
        self.parse_expression();
        if self.at(TokenKind::Where) {
            self.parse_where();
        }
        if self.at(TokenKind::Returns) {
            self.start(Rule::FilterReturns);
            self.bump();
            self.parse_expression();
            self.finish();
        }
        self.finish();
    }
}
