use std::fmt;

use serde::Serialize;

/// A 1-based line/column position plus the absolute char offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }

    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Compare by line and column only.
    pub fn precedes_or_eq(&self, line: u32, column: u32) -> bool {
        (self.line, self.column) <= (line, column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// End-exclusive source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn single(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    /// Smallest span covering both.
    pub fn cover(&self, other: &Span) -> Span {
        let start = if other.start.offset < self.start.offset {
            other.start
        } else {
            self.start
        };
        let end = if other.end.offset > self.end.offset {
            other.end
        } else {
            self.end
        };
        Span { start, end }
    }

    /// True when the (line, column) lies inside the span, both ends inclusive.
    pub fn touches(&self, line: u32, column: u32) -> bool {
        self.start.precedes_or_eq(line, column) && (line, column) <= (self.end.line, self.end.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}:{}-{}", self.start.line, self.start.column, self.end.column)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Syntax error with position information, reported through the error channel
/// of the lexer and parser rather than returned.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    pub fn new(message: String) -> Self {
        Self { message, span: None }
    }

    pub fn with_span(message: String, span: Span) -> Self {
        Self {
            message,
            span: Some(span),
        }
    }

    pub fn with_position(message: String, position: Position) -> Self {
        Self {
            message,
            span: Some(Span::single(position)),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(span) = &self.span {
            write!(f, "{} at {}", self.message, span)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ParseError {}

/// Failures the lexer cannot report as ordinary syntax errors.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// A `}` was read while no mode was pushed. Carries the token that was
    /// being produced when the stack ran out.
    ModeStackUnderflow { pending: super::Token },
    /// Braces and string interpolations nested beyond the lexer's limit.
    NestingTooDeep { position: Position, depth: usize },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::ModeStackUnderflow { pending } => {
                write!(f, "lexer mode stack underflow at {}", pending.span.start)
            }
            LexError::NestingTooDeep { position, depth } => {
                write!(f, "nesting deeper than {} levels at {}", depth, position)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Helper to convert character index to line/column position
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let mut line = 1;
    let mut column = 1;

    let mut chars = text.chars().enumerate().peekable();
    while let Some((i, ch)) = chars.next() {
        if i >= offset {
            break;
        }
        let lone_cr = ch == '\r' && chars.peek().is_none_or(|(_, next)| *next != '\n');
        if ch == '\n' || lone_cr {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    Position::new(line, column, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_position() {
        let text = "line1\nline2\nline3";

        assert_eq!(offset_to_position(text, 0), Position::new(1, 1, 0));
        assert_eq!(offset_to_position(text, 5), Position::new(1, 6, 5)); // at '\n'
        assert_eq!(offset_to_position(text, 6), Position::new(2, 1, 6)); // start of line2
        assert_eq!(offset_to_position(text, 12), Position::new(3, 1, 12));

        let text = "a\r\nb\rc\u{2028}d";
        assert_eq!(offset_to_position(text, 3), Position::new(2, 1, 3));
        assert_eq!(offset_to_position(text, 5), Position::new(3, 1, 5));
        assert_eq!(offset_to_position(text, 7), Position::new(3, 3, 7));
    }

    #[test]
    fn test_span_display() {
        let span1 = Span::new(Position::new(1, 5, 4), Position::new(1, 10, 9));
        assert_eq!(span1.to_string(), "1:5-10");

        let span2 = Span::new(Position::new(1, 5, 4), Position::new(3, 2, 20));
        assert_eq!(span2.to_string(), "1:5-3:2");
    }

    #[test]
    fn test_span_touches_is_inclusive() {
        let span = Span::new(Position::new(2, 3, 10), Position::new(2, 7, 14));
        assert!(span.touches(2, 3));
        assert!(span.touches(2, 7));
        assert!(!span.touches(2, 8));
        assert!(!span.touches(1, 40));
    }

    #[test]
    fn test_parse_error_display() {
        let err1 = ParseError::new("simple error".to_string());
        assert_eq!(err1.to_string(), "simple error");

        let err2 = ParseError::with_position("bad token".to_string(), Position::new(4, 2, 30));
        assert_eq!(err2.to_string(), "bad token at 4:2-2");
    }
}
