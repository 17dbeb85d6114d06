use super::Parser;
use crate::{token::TokenKind, tree::Rule};

/// Tokens that begin a top-level declaration; also the recovery set.
pub(crate) const DECLARATION_START: &[TokenKind] = &[
    TokenKind::Assert,
    TokenKind::Output,
    TokenKind::Function,
    TokenKind::Constant,
    TokenKind::Namespace,
    TokenKind::OutputAttribute,
    TokenKind::RuleNamePrefix,
    TokenKind::RuleNameSeparator,
];

impl<'a> Parser<'a> {
    pub fn parse_file(&mut self) {
        self.start(Rule::XuleFile);
        loop {
            self.at_any(DECLARATION_START);
            if self.at(TokenKind::Eof) {
                break;
            }
            match self.kind() {
                TokenKind::Assert => self.parse_assertion(Rule::AssertDeclaration),
                TokenKind::Output => self.parse_assertion(Rule::OutputDeclaration),
                TokenKind::Function => self.parse_function(),
                TokenKind::Constant => self.parse_constant(),
                TokenKind::Namespace => self.parse_namespace(),
                TokenKind::OutputAttribute => self.parse_simple_declaration(Rule::OutputAttributeDeclaration),
                TokenKind::RuleNamePrefix => self.parse_simple_declaration(Rule::RuleNamePrefix),
                TokenKind::RuleNameSeparator => self.parse_rule_name_separator(),
                other => {
                    self.error_here(format!("Expected a declaration, found {}", other.describe()));
                    self.recover_until(DECLARATION_START);
                }
            }
        }
        // EOF terminal closes the file node
        self.bump();
        self.finish();
    }

    /// `assert NAME [satisfied|unsatisfied] block attributes*` or
    /// `output NAME block attributes*`.
    fn parse_assertion(&mut self, rule: Rule) {
        self.start(rule);
        self.bump();

        self.start(Rule::AssertionName);
        if self.at_name() || self.at(TokenKind::Number) {
            self.bump();
            while self.kind() == TokenKind::Dot
                && matches!(self.nth_kind(1), TokenKind::Identifier | TokenKind::Number)
            {
                self.bump();
                self.bump();
            }
        } else {
            let found = self.kind().describe();
            self.error_here(format!("Expected rule name, found {}", found));
        }
        self.finish();

        if rule == Rule::AssertDeclaration && self.at_any(&[TokenKind::Satisfied, TokenKind::Unsatisfied]) {
            self.bump();
        }

        self.parse_expression_block();
        self.parse_output_attributes();
        self.finish();
    }

    fn parse_output_attributes(&mut self) {
        loop {
            self.predict(&[Rule::OutputAttributeName]);
            if !self.at(TokenKind::Identifier) {
                break;
            }
            self.start(Rule::OutputAttribute);
            self.start(Rule::OutputAttributeName);
            self.bump();
            self.finish();
            self.parse_expression();
            self.finish();
        }
    }

    /// `function NAME ( $arg, ... ) block`
    fn parse_function(&mut self) {
        self.start(Rule::FunctionDeclaration);
        self.bump();
        if self.at(TokenKind::Identifier) {
            self.bump();
        } else {
            let found = self.kind().describe();
            self.error_here(format!("Expected function name, found {}", found));
        }

        self.start(Rule::FunctionArguments);
        if self.expect(TokenKind::LParen) {
            if !self.at(TokenKind::RParen) {
                loop {
                    self.start(Rule::FunctionArgument);
                    if self.at(TokenKind::Variable) {
                        self.bump();
                    } else {
                        let found = self.kind().describe();
                        self.error_here(format!("Expected argument variable, found {}", found));
                    }
                    self.finish();
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen);
        }
        self.finish();

        self.parse_expression_block();
        self.finish();
    }

    /// `constant $NAME = block`
    fn parse_constant(&mut self) {
        self.start(Rule::ConstantDeclaration);
        self.bump();
        if self.at(TokenKind::Variable) {
            self.bump();
        } else {
            let found = self.kind().describe();
            self.error_here(format!("Expected constant name, found {}", found));
        }
        if self.expect(TokenKind::Assign) {
            self.parse_expression_block();
        }
        self.finish();
    }

    /// `namespace [PREFIX =] URI`
    fn parse_namespace(&mut self) {
        self.start(Rule::NamespaceDeclaration);
        self.bump();
        if self.at(TokenKind::Identifier) && self.nth_kind(1) == TokenKind::Assign {
            self.bump();
            self.bump();
        }
        if self.at(TokenKind::Url) {
            self.bump();
        } else if self.at(TokenKind::StringOpen) {
            self.parse_string_literal();
        } else {
            let found = self.kind().describe();
            self.error_here(format!("Expected namespace URI, found {}", found));
        }
        self.finish();
    }

    /// `output-attribute NAME` and `rule-name-prefix NAME`
    fn parse_simple_declaration(&mut self, rule: Rule) {
        self.start(rule);
        self.bump();
        if self.at(TokenKind::Identifier) {
            self.bump();
        } else {
            let found = self.kind().describe();
            self.error_here(format!("Expected name, found {}", found));
        }
        self.finish();
    }

    /// `rule-name-separator "SEP"`
    fn parse_rule_name_separator(&mut self) {
        self.start(Rule::RuleNameSeparator);
        self.bump();
        if self.at(TokenKind::StringOpen) {
            self.parse_string_literal();
        } else {
            let found = self.kind().describe();
            self.error_here(format!("Expected separator string, found {}", found));
        }
        self.finish();
    }
}
