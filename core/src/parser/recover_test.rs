#[cfg(test)]
mod tests {
    use crate::{
        parser::{MAX_EXPR_DEPTH, parse_source},
        tree::Rule,
    };

    #[test]
    fn test_recovers_at_next_declaration() {
        let out = parse_source("assert a satisfied 1 + ) junk\nconstant $c = 2").unwrap();
        assert!(!out.errors.is_empty());
        let tree = &out.tree;
        let constants = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|n| tree.rule(*n) == Some(Rule::ConstantDeclaration))
            .count();
        assert_eq!(constants, 1);
        assert!(
            tree.descendants(tree.root())
                .into_iter()
                .any(|n| tree.rule(n) == Some(Rule::Error))
        );
    }

    #[test]
    fn test_stray_token_before_declaration() {
        let out = parse_source(") assert a satisfied true").unwrap();
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.contains("declaration"));
        assert_eq!(out.errors[0].span.unwrap().start.column, 1);
    }

    #[test]
    fn test_missing_else_reported() {
        let out = parse_source("output o if true 1").unwrap();
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.contains("'else'"));
    }

    #[test]
    fn test_unclosed_factset() {
        let out = parse_source("output o {@concept = Assets\nassert b satisfied true").unwrap();
        assert!(!out.errors.is_empty());
        let tree = &out.tree;
        let asserts = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|n| tree.rule(*n) == Some(Rule::AssertDeclaration))
            .count();
        assert_eq!(asserts, 1);
    }

    #[test]
    fn test_stray_closing_brace_is_one_error() {
        let out = parse_source("output o 1 }").unwrap();
        // lexer reports the unmatched brace, parser then skips it
        assert_eq!(out.errors.len(), 1, "{:?}", out.errors);
        assert!(out.errors[0].message.contains("Extraneous"));
        assert_eq!(out.tree.children(out.tree.root()).len(), 3);
    }

    #[test]
    fn test_stray_brace_in_expression_position_reported_once() {
        let out = parse_source("output o }").unwrap();
        assert_eq!(out.errors.len(), 1, "{:?}", out.errors);
        assert!(out.errors[0].message.contains("Extraneous"));
        assert_eq!(out.errors[0].span.unwrap().start.column, 10);
    }

    #[test]
    fn test_deep_nesting_is_an_error_not_a_crash() {
        let input = format!("output o {}1", "(".repeat(MAX_EXPR_DEPTH * 3));
        let out = parse_source(&input).unwrap();
        assert!(out.errors.iter().any(|e| e.message.contains("nested too deeply")));
    }

    #[test]
    fn test_truncated_inputs_never_panic() {
        let full = "namespace us-gaap = http://fasb.org/us-gaap\n\
                    constant $c = 1\n\
                    function f($a, $b) $a + $b\n\
                    assert r.1 satisfied $x = {covered @concept = us-gaap:Assets as $v where $fact > 0}; \
                    navigate parent-child descendants from $x returns (target, weight)\n\
                    message \"{$x.name} {f(1, 2)}\" severity error";
        let chars: Vec<char> = full.chars().collect();
        for cut in 0..=chars.len() {
            let prefix: String = chars[..cut].iter().collect();
            if let Ok(out) = parse_source(&prefix) {
                let tree = &out.tree;
                assert_eq!(tree.rule(tree.root()), Some(Rule::XuleFile));
            }
        }
    }
}
