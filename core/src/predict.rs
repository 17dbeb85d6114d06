//! Caret prediction: which tokens and grammar rules could appear at a
//! given point of the token stream.

use crate::{parser::Parser, token::Token};

pub use crate::parser::CandidateSet;

/// Run the parser over `tokens` and collect what it would accept at the
/// stream index `caret_index`. Hidden and marker tokens are skipped, so the
/// caret maps to the first parser-visible token at or after it.
pub fn collect_candidates(tokens: &[Token], caret_index: usize) -> CandidateSet {
    let mut parser = Parser::probing(tokens, caret_index);
    parser.parse_file();
    let candidates = parser.into_candidates();
    tracing::trace!(
        caret_index,
        tokens = candidates.tokens.len(),
        rules = candidates.rules.len(),
        "collected candidates"
    );
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        token::{TokenKind, tokenize_for_completion},
        tree::Rule,
    };

    fn candidates_at_end(input: &str) -> CandidateSet {
        let tokens = tokenize_for_completion(input).unwrap().tokens;
        let caret = tokens.len() - 1;
        collect_candidates(&tokens, caret)
    }

    #[test]
    fn test_empty_document_expects_declarations() {
        let set = candidates_at_end("");
        assert!(set.tokens.contains(&TokenKind::Assert));
        assert!(set.tokens.contains(&TokenKind::Constant));
        assert!(!set.tokens.contains(&TokenKind::Eof));
    }

    #[test]
    fn test_expression_position_predicts_primaries() {
        let set = candidates_at_end("assert a satisfied ");
        assert!(set.rules.contains(&Rule::VariableRead));
        assert!(set.rules.contains(&Rule::QualifiedName));
        assert!(set.tokens.contains(&TokenKind::If));
        assert!(set.tokens.contains(&TokenKind::Navigate));
    }

    #[test]
    fn test_after_dot_predicts_property() {
        let set = candidates_at_end("assert a satisfied $x.");
        assert!(set.rules.contains(&Rule::PropertyRef));
    }

    #[test]
    fn test_after_navigate_predicts_direction() {
        let set = candidates_at_end("assert a satisfied navigate ");
        assert!(set.rules.contains(&Rule::NavigationDirection));
    }

    #[test]
    fn test_returns_predicts_option() {
        let set = candidates_at_end("assert a satisfied navigate parent-child descendants returns (");
        assert!(set.rules.contains(&Rule::ReturnOption));
    }

    #[test]
    fn test_after_expression_predicts_output_attribute() {
        let set = candidates_at_end("assert a satisfied true ");
        assert!(set.rules.contains(&Rule::OutputAttributeName));
        assert!(set.tokens.contains(&TokenKind::Assert));
    }

    #[test]
    fn test_qualified_name_in_progress() {
        let set = candidates_at_end("assert a satisfied us-gaap:");
        assert!(set.rules.contains(&Rule::QualifiedName));
    }

    #[test]
    fn test_caret_on_partial_word_uses_that_token() {
        let input = "assert a satisfied $x.len";
        let tokens = tokenize_for_completion(input).unwrap().tokens;
        let word = tokens.iter().find(|t| t.text == "len").unwrap().index;
        let set = collect_candidates(&tokens, word);
        assert!(set.rules.contains(&Rule::PropertyRef));
    }
}
