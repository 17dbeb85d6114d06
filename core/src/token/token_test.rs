#[cfg(test)]
mod tests {
    use crate::token::{
        Channel, LexError, Lexer, TokenKind, TokenSource, tokenize, tokenize_for_completion,
    };

    fn visible_kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .tokens
            .into_iter()
            .filter(|t| t.is_visible())
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn basic() {
        let kinds = visible_kinds("assert F6.110.1 satisfied true");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Assert,
                TokenKind::Identifier,
                TokenKind::Dot,
                TokenKind::Number,
                TokenKind::Satisfied,
                TokenKind::True,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_hyphenated_names_and_operators() {
        let out = tokenize("$rule-value - us-gaap:Assets <+> 2").unwrap();
        let visible: Vec<_> = out.tokens.iter().filter(|t| t.is_visible()).collect();
        assert_eq!(visible[0].kind, TokenKind::Variable);
        assert_eq!(visible[0].text, "$rule-value");
        assert_eq!(visible[1].kind, TokenKind::Sub);
        assert_eq!(visible[2].text, "us-gaap");
        assert_eq!(visible[3].kind, TokenKind::Colon);
        assert_eq!(visible[4].text, "Assets");
        assert_eq!(visible[5].kind, TokenKind::AddBoth);
        assert_eq!(visible[6].kind, TokenKind::Number);
    }

    #[test]
    fn test_keywords_with_hyphens() {
        let kinds = visible_kinds("output-attribute covered-dims rule-name-prefix");
        assert_eq!(
            kinds,
            vec![
                TokenKind::OutputAttribute,
                TokenKind::CoveredDims,
                TokenKind::RuleNamePrefix,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_url_token() {
        let out = tokenize("namespace us-gaap = http://fasb.org/us-gaap/2023").unwrap();
        let url = out.tokens.iter().find(|t| t.kind == TokenKind::Url).expect("url token");
        assert_eq!(url.text, "http://fasb.org/us-gaap/2023");
    }

    #[test]
    fn test_trivia_is_hidden() {
        let out = tokenize("1 // note\n/* block\ncomment */ 2").unwrap();
        let hidden: Vec<_> = out.tokens.iter().filter(|t| t.channel == Channel::Hidden).collect();
        assert!(hidden.iter().any(|t| t.kind == TokenKind::Comment && t.text == "// note"));
        let block = hidden
            .iter()
            .find(|t| t.kind == TokenKind::Comment && t.text.starts_with("/*"))
            .unwrap();
        assert_eq!(block.span.start.line, 2);
        assert_eq!(block.span.end.line, 3);
        assert!(out.errors.is_empty());
    }

    #[test]
    fn test_string_interpolation_modes() {
        let kinds = visible_kinds(r#""value {$fact} here""#);
        assert_eq!(
            kinds,
            vec![
                TokenKind::StringOpen,
                TokenKind::StringContent,
                TokenKind::LBrace,
                TokenKind::Variable,
                TokenKind::RBrace,
                TokenKind::StringContent,
                TokenKind::StringClose,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_multiline_string_content_span() {
        let out = tokenize("'first\nsecond'").unwrap();
        let content = out
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::StringContent)
            .unwrap();
        assert_eq!(content.span.start.line, 1);
        assert_eq!(content.span.end.line, 2);
        assert_eq!(content.span.end.column, 7);
    }

    #[test]
    fn test_line_breaks_match_editor_lines() {
        let out = tokenize("output a 1\r\noutput b 2\routput c '\u{2028}' $x").unwrap();
        let lines: Vec<u32> = out
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Output || t.kind == TokenKind::Variable)
            .map(|t| t.span.start.line)
            .collect();
        assert_eq!(lines, vec![1, 2, 3, 3]);
    }

    #[test]
    fn test_raw_lexer_underflow_on_stray_brace() {
        let mut lexer = Lexer::new("1 }");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Number);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Whitespace);
        match lexer.next_token() {
            Err(LexError::ModeStackUnderflow { pending }) => assert_eq!(pending.text, "}"),
            other => panic!("expected underflow, got {:?}", other),
        }
    }

    #[test]
    fn test_source_reports_stray_brace() {
        let out = tokenize("assert a satisfied true }").unwrap();
        assert!(out.tokens.iter().any(|t| t.kind == TokenKind::RBrace));
        assert_eq!(out.errors.len(), 1);
        let span = out.errors[0].span.unwrap();
        assert_eq!(span.start.column, 25);
        assert_eq!(out.tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_nesting_limit_propagates() {
        let input = "{".repeat(crate::token::MAX_MODE_DEPTH + 1);
        let err = TokenSource::new(&input).tokenize().unwrap_err();
        assert!(matches!(err, LexError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_boundary_markers_between_adjacent_tokens() {
        let out = tokenize_for_completion("$a.b (x)").unwrap();
        let markers: Vec<_> = out.tokens.iter().filter(|t| t.channel == Channel::Marker).collect();
        // $a|.|b and (|x|) are adjacent pairs; "b (" is separated by whitespace
        assert_eq!(markers.len(), 4);
        assert!(markers.iter().all(|m| m.text.is_empty() && m.span.is_empty()));
        for (i, token) in out.tokens.iter().enumerate() {
            assert_eq!(token.index, i);
        }
        let plain = tokenize("$a.b (x)").unwrap();
        assert!(plain.tokens.iter().all(|t| t.channel != Channel::Marker));
    }

    #[test]
    fn test_unrecognized_character_is_reported() {
        let out = tokenize("1 ? 2").unwrap();
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.contains('?'));
        let numbers = out.tokens.iter().filter(|t| t.kind == TokenKind::Number).count();
        assert_eq!(numbers, 2);
    }
}
