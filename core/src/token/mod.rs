mod adapter;
mod error;
mod kind;
mod lexer;

#[cfg(test)]
mod token_test;

pub use adapter::{tokenize, tokenize_for_completion, LexOutput, TokenSource};
pub use error::{offset_to_position, LexError, ParseError, Position, Span};
pub use kind::{Channel, TokenKind};
pub use lexer::{Lexer, Token, MAX_MODE_DEPTH};
