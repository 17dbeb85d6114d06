//! Token source wrapping the raw lexer.
//!
//! Two things differ from the raw lexer:
//! - a `}` that underflows the lexer's mode stack is emitted as an ordinary
//!   token and reported as a syntax error instead of aborting lexing;
//! - with boundary markers enabled, a zero-width marker token is emitted
//!   between two visible tokens that touch, so a caret sitting exactly between
//!   them always has a token index of its own.

use crate::token::{Channel, LexError, Lexer, ParseError, Span, Token, TokenKind};

/// All tokens of a document plus the syntax errors found while lexing.
#[derive(Debug, Clone, Default)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
}

pub struct TokenSource {
    lexer: Lexer,
    boundary_markers: bool,
    pending: Option<Token>,
    previous: Option<Token>,
    errors: Vec<ParseError>,
}

impl TokenSource {
    pub fn new(input: &str) -> Self {
        Self {
            lexer: Lexer::new(input),
            boundary_markers: false,
            pending: None,
            previous: None,
            errors: Vec::new(),
        }
    }

    /// Variant used for completion: injects boundary markers.
    pub fn with_boundary_markers(input: &str) -> Self {
        Self {
            boundary_markers: true,
            ..Self::new(input)
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if let Some(token) = self.pending.take() {
            self.previous = Some(token.clone());
            return Ok(token);
        }

        let token = match self.lexer.next_token() {
            Ok(token) => token,
            Err(LexError::ModeStackUnderflow { pending }) => {
                if pending.text == "}" {
                    self.errors.push(ParseError::with_span(
                        "Extraneous '}' without a matching '{'".to_string(),
                        pending.span,
                    ));
                }
                pending
            }
            Err(other) => return Err(other),
        };

        if self.boundary_markers && token.kind != TokenKind::Eof {
            if let Some(prev) = &self.previous {
                let adjacent = prev.span.end.offset == token.span.start.offset;
                if adjacent && prev.is_visible() && token.is_visible() {
                    let marker = Token::new(
                        TokenKind::Whitespace,
                        String::new(),
                        Span::single(token.span.start),
                        Channel::Marker,
                    );
                    self.pending = Some(token);
                    self.previous = Some(marker.clone());
                    return Ok(marker);
                }
            }
        }

        self.previous = Some(token.clone());
        Ok(token)
    }

    /// Drain the source up to and including EOF, numbering tokens by stream index.
    pub fn tokenize(mut self) -> Result<LexOutput, LexError> {
        let mut tokens = Vec::new();
        loop {
            let mut token = self.next_token()?;
            token.index = tokens.len();
            let at_end = token.kind == TokenKind::Eof;
            tokens.push(token);
            if at_end {
                break;
            }
        }
        let mut errors = self.lexer.take_errors();
        errors.append(&mut self.errors);
        errors.sort_by_key(|e| e.span.map(|s| s.start.offset).unwrap_or(0));
        Ok(LexOutput { tokens, errors })
    }
}

pub fn tokenize(input: &str) -> Result<LexOutput, LexError> {
    TokenSource::new(input).tokenize()
}

pub fn tokenize_for_completion(input: &str) -> Result<LexOutput, LexError> {
    TokenSource::with_boundary_markers(input).tokenize()
}
