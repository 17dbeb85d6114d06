use crate::token::{Channel, LexError, ParseError, Position, Span, TokenKind};

/// Deepest brace/interpolation nesting the lexer accepts.
pub const MAX_MODE_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    pub channel: Channel,
    /// Index in the token stream the token was emitted into.
    pub index: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: String, span: Span, channel: Channel) -> Self {
        Self {
            kind,
            text,
            span,
            channel,
            index: 0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.channel == Channel::Default
    }

    /// Length of the token text in chars.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Default,
    Str(char),
}

#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Raw XULE lexer. Braces and quotes drive a mode stack; everything else is
/// context free. Use [`super::TokenSource`] instead of calling this directly.
pub struct Lexer {
    chars: Vec<char>,
    idx: usize,
    line: u32,
    column: u32,
    modes: Vec<Mode>,
    errors: Vec<ParseError>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            idx: 0,
            line: 1,
            column: 1,
            modes: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn current_position(&self) -> Position {
        Position::new(self.line, self.column, self.idx)
    }

    /// Syntax errors reported so far (unrecognized characters).
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Default)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.idx + ahead).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.idx).copied()?;
        self.idx += 1;
        // `\r\n` breaks on its `\n`; a lone `\r` breaks by itself.
        if c == '\n' || (c == '\r' && self.peek() != Some('\n')) {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn text_from(&self, start: &Position) -> String {
        self.chars[start.offset..self.idx].iter().collect()
    }

    fn make(&self, kind: TokenKind, start: Position, channel: Channel) -> Token {
        let span = Span::new(start, self.current_position());
        Token::new(kind, self.text_from(&start), span, channel)
    }

    fn push_mode(&mut self, mode: Mode) -> Result<(), LexError> {
        if self.modes.len() >= MAX_MODE_DEPTH {
            return Err(LexError::NestingTooDeep {
                position: self.current_position(),
                depth: MAX_MODE_DEPTH,
            });
        }
        self.modes.push(mode);
        Ok(())
    }

    /// Produce the next token. Once the input is exhausted every call yields EOF.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if let Mode::Str(quote) = self.mode() {
            return self.string_token(quote);
        }
        loop {
            let start = self.current_position();
            let Some(c) = self.peek() else {
                return Ok(Token::new(TokenKind::Eof, String::new(), Span::single(start), Channel::Default));
            };

            if c.is_whitespace() {
                while self.peek().is_some_and(char::is_whitespace) {
                    self.advance();
                }
                return Ok(self.make(TokenKind::Whitespace, start, Channel::Hidden));
            }

            if c == '/' && self.peek_at(1) == Some('/') {
                while self.peek().is_some_and(|ch| ch != '\n' && ch != '\r') {
                    self.advance();
                }
                return Ok(self.make(TokenKind::Comment, start, Channel::Hidden));
            }

            if c == '/' && self.peek_at(1) == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.peek() {
                        None => {
                            self.errors.push(ParseError::with_position(
                                "Unterminated block comment".to_string(),
                                start,
                            ));
                            break;
                        }
                        Some('*') if self.peek_at(1) == Some('/') => {
                            self.advance();
                            self.advance();
                            break;
                        }
                        Some(_) => {
                            self.advance();
                        }
                    }
                }
                return Ok(self.make(TokenKind::Comment, start, Channel::Hidden));
            }

            if c == '"' || c == '\'' {
                self.advance();
                self.push_mode(Mode::Str(c))?;
                return Ok(self.make(TokenKind::StringOpen, start, Channel::Default));
            }

            if c == '{' {
                self.advance();
                self.push_mode(Mode::Default)?;
                return Ok(self.make(TokenKind::LBrace, start, Channel::Default));
            }

            if c == '}' {
                self.advance();
                let token = self.make(TokenKind::RBrace, start, Channel::Default);
                if self.modes.pop().is_none() {
                    return Err(LexError::ModeStackUnderflow { pending: token });
                }
                return Ok(token);
            }

            if c == '$' && self.peek_at(1).is_some_and(is_ident_start) {
                self.advance();
                self.consume_name();
                return Ok(self.make(TokenKind::Variable, start, Channel::Default));
            }

            if is_ident_start(c) {
                self.consume_name();
                if self.peek() == Some(':') && self.peek_at(1) == Some('/') && self.peek_at(2) == Some('/') {
                    while self.peek().is_some_and(|ch| !ch.is_whitespace()) {
                        self.advance();
                    }
                    return Ok(self.make(TokenKind::Url, start, Channel::Default));
                }
                let text = self.text_from(&start);
                let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
                return Ok(Token::new(
                    kind,
                    text,
                    Span::new(start, self.current_position()),
                    Channel::Default,
                ));
            }

            if c.is_ascii_digit() {
                self.consume_number();
                return Ok(self.make(TokenKind::Number, start, Channel::Default));
            }

            if let Some(kind) = self.operator() {
                return Ok(self.make(kind, start, Channel::Default));
            }

            self.advance();
            self.errors.push(ParseError::with_span(
                format!("Unrecognized character '{}'", c),
                Span::new(start, self.current_position()),
            ));
        }
    }

    /// Identifier characters, allowing single hyphens between name characters.
    fn consume_name(&mut self) {
        while let Some(c) = self.peek() {
            if is_ident_char(c) {
                self.advance();
            } else if c == '-' && self.peek_at(1).is_some_and(is_ident_char) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn consume_number(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let digits_at = if matches!(self.peek_at(1), Some('+') | Some('-')) { 2 } else { 1 };
            if self.peek_at(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digits_at {
                    self.advance();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }
    }

    fn operator(&mut self) -> Option<TokenKind> {
        let c = self.peek()?;
        let next = self.peek_at(1);
        let third = self.peek_at(2);
        let (kind, width) = match (c, next, third) {
            ('<', Some('+'), Some('>')) => (TokenKind::AddBoth, 3),
            ('<', Some('-'), Some('>')) => (TokenKind::SubBoth, 3),
            ('<', Some('+'), _) => (TokenKind::AddLeft, 2),
            ('<', Some('-'), _) => (TokenKind::SubLeft, 2),
            ('<', Some('='), _) => (TokenKind::Le, 2),
            ('<', _, _) => (TokenKind::Lt, 1),
            ('>', Some('='), _) => (TokenKind::Ge, 2),
            ('>', _, _) => (TokenKind::Gt, 1),
            ('=', Some('='), _) => (TokenKind::Eq, 2),
            ('=', _, _) => (TokenKind::Assign, 1),
            ('!', Some('='), _) => (TokenKind::Ne, 2),
            ('+', Some('>'), _) => (TokenKind::AddRight, 2),
            ('+', _, _) => (TokenKind::Add, 1),
            ('-', Some('>'), _) => (TokenKind::SubRight, 2),
            ('-', _, _) => (TokenKind::Sub, 1),
            ('*', _, _) => (TokenKind::Mul, 1),
            ('/', _, _) => (TokenKind::Div, 1),
            ('(', _, _) => (TokenKind::LParen, 1),
            (')', _, _) => (TokenKind::RParen, 1),
            ('[', _, _) => (TokenKind::LBracket, 1),
            (']', _, _) => (TokenKind::RBracket, 1),
            (',', _, _) => (TokenKind::Comma, 1),
            (';', _, _) => (TokenKind::Semicolon, 1),
            (':', _, _) => (TokenKind::Colon, 1),
            ('.', _, _) => (TokenKind::Dot, 1),
            ('@', _, _) => (TokenKind::At, 1),
            _ => return None,
        };
        for _ in 0..width {
            self.advance();
        }
        Some(kind)
    }

    fn string_token(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.current_position();
        match self.peek() {
            None => Ok(Token::new(TokenKind::Eof, String::new(), Span::single(start), Channel::Default)),
            Some(c) if c == quote => {
                self.advance();
                self.modes.pop();
                Ok(self.make(TokenKind::StringClose, start, Channel::Default))
            }
            Some('{') => {
                self.advance();
                self.push_mode(Mode::Default)?;
                Ok(self.make(TokenKind::LBrace, start, Channel::Default))
            }
            Some(_) => {
                while let Some(c) = self.peek() {
                    if c == quote || c == '{' {
                        break;
                    }
                    if c == '\\' && self.peek_at(1).is_some() {
                        self.advance();
                    }
                    self.advance();
                }
                Ok(self.make(TokenKind::StringContent, start, Channel::Default))
            }
        }
    }
}
