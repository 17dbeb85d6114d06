//! Syntax layer for the XULE rule language: tokens, the concrete syntax
//! tree, a recovering parser, caret prediction and the built-in vocabulary.

pub mod parser;
pub mod predict;
pub mod token;
pub mod tree;
pub mod util;
pub mod vocab;

pub use parser::{CandidateSet, ParseOutput, merge_errors, parse, parse_source};
pub use vocab::{Module, VocabKind, Vocabulary};
