use super::Parser;
use crate::{token::TokenKind, tree::Rule};

const COMPARISON_OPS: &[TokenKind] = &[
    TokenKind::Eq,
    TokenKind::Ne,
    TokenKind::Lt,
    TokenKind::Gt,
    TokenKind::Le,
    TokenKind::Ge,
    TokenKind::In,
];

const ADDITIVE_OPS: &[TokenKind] = &[
    TokenKind::Add,
    TokenKind::Sub,
    TokenKind::AddBoth,
    TokenKind::AddLeft,
    TokenKind::AddRight,
    TokenKind::SubBoth,
    TokenKind::SubLeft,
    TokenKind::SubRight,
];

/// Keyword tokens that may begin a primary expression.
const PRIMARY_KEYWORDS: &[TokenKind] = &[
    TokenKind::If,
    TokenKind::For,
    TokenKind::Navigate,
    TokenKind::Filter,
    TokenKind::True,
    TokenKind::False,
    TokenKind::NoneValue,
    TokenKind::Skip,
    TokenKind::Not,
];

impl<'a> Parser<'a> {
    /// `(assignment)* expression`
    pub(super) fn parse_expression_block(&mut self) {
        self.start(Rule::ExpressionBlock);
        loop {
            self.predict(&[Rule::AssignedVariable]);
            if self.at(TokenKind::Variable) && self.nth_kind(1) == TokenKind::Assign {
                self.parse_assignment();
            } else {
                break;
            }
        }
        self.parse_expression();
        self.finish();
    }

    /// `$name = block ;`
    fn parse_assignment(&mut self) {
        self.start(Rule::Assignment);
        self.start(Rule::AssignedVariable);
        self.bump();
        self.finish();
        self.bump(); // '='
        self.parse_expression_block();
        self.expect(TokenKind::Semicolon);
        self.finish();
    }

    pub(super) fn parse_expression(&mut self) {
        if !self.enter() {
            return;
        }
        self.parse_or();
        self.leave();
    }

    fn parse_or(&mut self) {
        self.parse_and();
        while self.at(TokenKind::Or) {
            self.wrap(Rule::BinaryExpression);
            self.bump();
            self.parse_and();
            self.finish();
        }
    }

    fn parse_and(&mut self) {
        self.parse_not();
        while self.at(TokenKind::And) {
            self.wrap(Rule::BinaryExpression);
            self.bump();
            self.parse_not();
            self.finish();
        }
    }

    fn parse_not(&mut self) {
        if self.at(TokenKind::Not) && self.nth_kind(1) != TokenKind::In {
            if !self.enter() {
                return;
            }
            self.start(Rule::UnaryExpression);
            self.bump();
            self.parse_not();
            self.finish();
            self.leave();
        } else {
            self.parse_comparison();
        }
    }

    fn parse_comparison(&mut self) {
        self.parse_additive();
        loop {
            let not_in = self.kind() == TokenKind::Not && self.nth_kind(1) == TokenKind::In;
            if !(self.at_any(COMPARISON_OPS) || not_in) {
                break;
            }
            self.wrap(Rule::BinaryExpression);
            if not_in {
                self.bump();
            }
            self.bump();
            self.parse_additive();
            self.finish();
        }
    }

    fn parse_additive(&mut self) {
        self.parse_multiplicative();
        while self.at_any(ADDITIVE_OPS) {
            self.wrap(Rule::BinaryExpression);
            self.bump();
            self.parse_multiplicative();
            self.finish();
        }
    }

    fn parse_multiplicative(&mut self) {
        self.parse_unary();
        while self.at_any(&[TokenKind::Mul, TokenKind::Div]) {
            self.wrap(Rule::BinaryExpression);
            self.bump();
            self.parse_unary();
            self.finish();
        }
    }

    fn parse_unary(&mut self) {
        if self.at_any(&[TokenKind::Sub, TokenKind::Add]) {
            if !self.enter() {
                return;
            }
            self.start(Rule::UnaryExpression);
            self.bump();
            self.parse_unary();
            self.finish();
            self.leave();
        } else {
            self.parse_postfix();
        }
    }

    /// `primary ( . property [args] )*`
    fn parse_postfix(&mut self) {
        self.parse_primary();
        while self.at(TokenKind::Dot) {
            self.wrap(Rule::PropertyAccess);
            self.bump();
            self.start(Rule::PropertyRef);
            if self.at_name() {
                self.bump();
            } else {
                let found = self.kind().describe();
                self.error_here(format!("Expected property name, found {}", found));
            }
            self.finish();
            if self.at(TokenKind::LParen) {
                self.parse_argument_list();
            }
            self.finish();
        }
    }

    fn parse_primary(&mut self) {
        self.predict(&[
            Rule::VariableRead,
            Rule::QualifiedName,
            Rule::BooleanLiteral,
            Rule::CallExpression,
        ]);
        self.at_any(&[
            TokenKind::Variable,
            TokenKind::Identifier,
            TokenKind::Number,
            TokenKind::StringOpen,
        ]);
        self.at_any(PRIMARY_KEYWORDS);

        match self.kind() {
            TokenKind::Number => self.parse_leaf(Rule::NumberLiteral),
            TokenKind::StringOpen => self.parse_string_literal(),
            TokenKind::True | TokenKind::False => self.parse_leaf(Rule::BooleanLiteral),
            TokenKind::NoneValue | TokenKind::Skip => self.parse_leaf(Rule::KeywordLiteral),
            TokenKind::Variable | TokenKind::Identifier if self.nth_kind(1) == TokenKind::LParen => {
                self.parse_call();
            }
            TokenKind::Variable => self.parse_leaf(Rule::VariableRead),
            TokenKind::Identifier => {
                self.parse_qualified_name();
                if self.kind() == TokenKind::LParen {
                    // prefix:name(...)
                    self.wrap(Rule::CallExpression);
                    self.parse_argument_list();
                    self.finish();
                }
            }
            TokenKind::LParen => self.parse_parenthesized(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::LBrace | TokenKind::LBracket => self.parse_factset(),
            TokenKind::Navigate => self.parse_navigation(),
            TokenKind::Filter => self.parse_filter(),
            other => {
                self.error_here(format!("Expected expression, found {}", other.describe()));
            }
        }
    }

    pub(super) fn parse_leaf(&mut self, rule: Rule) {
        self.start(rule);
        self.bump();
        self.finish();
    }

    /// `NAME ( args )` or `$name ( args )`
    fn parse_call(&mut self) {
        self.start(Rule::CallExpression);
        self.parse_leaf(Rule::FunctionRef);
        self.parse_argument_list();
        self.finish();
    }

    pub(super) fn parse_argument_list(&mut self) {
        self.start(Rule::ArgumentList);
        if self.expect(TokenKind::LParen) {
            if !self.at(TokenKind::RParen) {
                loop {
                    self.parse_expression_block();
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen);
        }
        self.finish();
    }

    /// `NAME [: NAME]`; both parts may be spelled like keywords.
    pub(super) fn parse_qualified_name(&mut self) {
        self.start(Rule::QualifiedName);
        if self.at_name() {
            self.bump();
        } else {
            let found = self.kind().describe();
            self.error_here(format!("Expected name, found {}", found));
        }
        if self.at(TokenKind::Colon) {
            self.bump();
            if self.at_name() {
                self.bump();
            } else {
                let found = self.kind().describe();
                self.error_here(format!("Expected local name, found {}", found));
            }
        }
        self.finish();
    }

    /// Quoted text with `{ block }` interpolations.
    pub(super) fn parse_string_literal(&mut self) {
        self.start(Rule::StringLiteral);
        self.bump();
        loop {
            match self.kind() {
                TokenKind::StringContent => self.bump(),
                TokenKind::LBrace => {
                    self.bump();
                    self.parse_expression_block();
                    self.expect(TokenKind::RBrace);
                }
                TokenKind::StringClose => {
                    self.bump();
                    break;
                }
                _ => {
                    self.error_here("Unterminated string literal".to_string());
                    break;
                }
            }
        }
        self.finish();
    }

    fn parse_parenthesized(&mut self) {
        self.start(Rule::ParenthesizedExpression);
        self.bump();
        self.parse_expression_block();
        self.expect(TokenKind::RParen);
        self.finish();
    }

    /// `if cond block else block`
    fn parse_if(&mut self) {
        self.start(Rule::IfExpression);
        self.bump();
        self.parse_expression();
        self.parse_expression_block();
        if self.expect(TokenKind::Else) {
            self.parse_expression_block();
        }
        self.finish();
    }

    /// `for [(] $var in expr [)] block`
    fn parse_for(&mut self) {
        self.start(Rule::ForExpression);
        self.bump();
        let parenthesized = self.eat(TokenKind::LParen);
        self.start(Rule::ForVariable);
        if self.at(TokenKind::Variable) {
            self.bump();
        } else {
            let found = self.kind().describe();
            self.error_here(format!("Expected loop variable, found {}", found));
        }
        self.finish();
        if self.expect(TokenKind::In) {
            self.parse_expression();
        }
        if parenthesized {
            self.expect(TokenKind::RParen);
        }
        self.parse_expression_block();
        self.finish();
    }
}
