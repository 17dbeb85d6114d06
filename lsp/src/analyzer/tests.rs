use super::*;
use std::collections::HashSet;
use tower_lsp::lsp_types::{CompletionItemKind, DiagnosticSeverity, NumberOrString, Position, Range};
use xule_core::tree::Rule;

fn analyze(text: &str) -> AnalysisResult {
    XuleAnalyzer::new().analyze_text(text)
}

fn codes(result: &AnalysisResult) -> Vec<String> {
    result
        .diagnostics
        .iter()
        .filter_map(|d| match &d.code {
            Some(NumberOrString::String(code)) => Some(code.clone()),
            _ => None,
        })
        .collect()
}

fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

/// LSP position at the end of `text`.
fn end_of(text: &str) -> Position {
    let line = text.matches('\n').count() as u32;
    let last = text.rsplit('\n').next().unwrap_or("");
    Position::new(line, last.encode_utf16().count() as u32)
}

fn namespaces() -> NamespaceSet {
    NamespaceSet::from_json(r#"{"us-gaap": {"http://fasb.org/us-gaap/2024": ["Assets", "Liabilities"]}}"#).unwrap()
}

#[test]
fn test_declared_before_use_has_no_diagnostics() {
    let code = "constant $threshold = 100\n\
                function double($value) $value * 2\n\
                output-attribute note\n\
                assert r.1 satisfied\n\
                    $total = double($threshold);\n\
                    $total > 0\n\
                note \"checked\"\n\
                message \"{$total} above {$threshold}\"";
    let result = analyze(code);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn test_dotted_assertion_name() {
    let result = analyze("assert F6.110.1 satisfied true");
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn test_variable_sigil_call_is_one_unknown_function() {
    let result = analyze("output o $foo()");
    assert_eq!(result.diagnostics.len(), 1);
    let diag = &result.diagnostics[0];
    assert!(diag.message.contains("$foo"));
    assert_eq!(diag.code, Some(NumberOrString::String("unknown-function".to_string())));
    assert_eq!(diag.severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(diag.source.as_deref(), Some("xule"));
    assert_eq!(diag.range, Range::new(Position::new(0, 9), Position::new(0, 13)));
}

#[test]
fn test_navigation_binds_relationship() {
    let code = "output o count(navigate summation-item descendants include start from Assets \
                stop when $relationship.weight == 1 returns (target))";
    let result = analyze(code);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn test_factset_binds_member_and_fact() {
    let code = "output o {covered @Axis = * as $myMember where $fact > 0 and $myMember == Foo}";
    let result = analyze(code);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn test_use_before_assignment_is_unknown() {
    let code = "output o\n  $y = $z;\n  $z = 1;\n  $y";
    let result = analyze(code);
    assert_eq!(codes(&result), ["unknown-variable"]);
    assert_eq!(result.diagnostics[0].range.start, Position::new(1, 7));
}

#[test]
fn test_unknown_property_and_output_attribute() {
    let result = analyze("constant $x = 1\noutput o $x.bogus\nfoo \"x\"");
    assert_eq!(codes(&result), ["unknown-property", "unknown-output-attribute"]);
}

#[test]
fn test_checks_can_be_disabled() {
    let code = "output o nope($missing.bogus)";
    assert_eq!(analyze(code).diagnostics.len(), 3);

    let analyzer = XuleAnalyzer::with_checks(CheckSettings {
        functions: false,
        properties: true,
        variables: false,
    });
    let result = analyzer.analyze_text(code);
    assert_eq!(codes(&result), ["unknown-property"]);
}

#[test]
fn test_syntax_errors_are_reported() {
    let result = analyze("output o (1 +");
    assert!(!result.diagnostics.is_empty());
    assert!(codes(&result).iter().all(|c| c == "syntax-error"));
}

#[test]
fn test_shadowed_variable_resolution() {
    let code = "output o\n  $x = 1;\n  $inner = ($x = 2; $x);\n  $x";
    let result = analyze(code);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);

    let state = &result.state;
    let tree = &state.unit.primary().tree;
    let declarations: Vec<_> = tree
        .descendants(tree.root())
        .into_iter()
        .filter(|n| tree.rule(*n) == Some(Rule::AssignedVariable) && tree.text(*n) == "$x")
        .map(|n| tree.first_terminal(n).unwrap())
        .collect();
    let reads: Vec<_> = tree
        .descendants(tree.root())
        .into_iter()
        .filter(|n| tree.rule(*n) == Some(Rule::VariableRead))
        .collect();
    assert_eq!(declarations.len(), 2);
    assert_eq!(reads.len(), 2);

    let resolve = |node| {
        state
            .symbols
            .lookup(&state.unit, NodeRef::new(0, node), "$x", symbols::BindingKind::Variable)
            .unwrap()
            .declared_at
            .node
    };
    assert_eq!(resolve(reads[0]), declarations[1]);
    assert_eq!(resolve(reads[1]), declarations[0]);
}

#[test]
fn test_position_resolution_is_total() {
    let code = "namespace us-gaap = http://fasb.org/us-gaap\n\
                constant $c = {@concept = us-gaap:Assets}\n\
                function f($a, $b)\n    $a + $b\n\n\
                assert r.1 satisfied $x = \"a{$c}\nb\"; f($x, 2) > 0\n\
                message \"{$rule-value}\"  ";
    let state = analyze(code).state;
    let tree = &state.unit.primary().tree;
    let chars: Vec<char> = code.chars().collect();
    let (mut line, mut column) = (1u32, 1u32);
    for offset in 0..=chars.len() {
        let info = position::resolve(tree, line, column)
            .unwrap_or_else(|| panic!("no node at offset {offset}"));
        let span = tree.span(info.node).unwrap();
        assert!(span.start.offset <= offset, "node starts after offset {offset}");
        if span.end.offset < offset {
            let gap: String = chars[span.end.offset..offset].iter().collect();
            assert!(gap.trim().is_empty(), "non-trivia gap {gap:?} at offset {offset}");
        }
        assert!(info.token_index < tree.tokens().len());
        if offset < chars.len() {
            if chars[offset] == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
    }
}

#[test]
fn test_property_completion_after_dot() {
    let code = "constant $x = 1\noutput o $x.";
    let state = analyze(code).state;
    let items = state.completions(end_of(code));
    assert!(labels(&items).contains(&"length"));
    assert!(items.iter().all(|i| i.kind == Some(CompletionItemKind::PROPERTY)));
    assert!(!labels(&items).contains(&"$x"));
}

#[test]
fn test_property_completion_filters_typed_prefix() {
    let code = "constant $x = 1\noutput o $x.lowe";
    let state = analyze(code).state;
    let items = state.completions(end_of(code));
    assert_eq!(labels(&items).first(), Some(&"lower-case"));
    assert!(!labels(&items).contains(&"concept"));
}

#[test]
fn test_variable_completion_in_scope() {
    let code = "output o\n    $amount = 1;\n    $am";
    let state = analyze(code).state;
    let items = state.completions(end_of(code));
    let amount = items.iter().find(|i| i.label == "$amount").unwrap();
    assert_eq!(amount.kind, Some(CompletionItemKind::VARIABLE));
}

#[test]
fn test_expression_completion_groups() {
    let code = "constant $limit = 1\nfunction helper($a) $a\noutput o ";
    let state = analyze(code).state;
    let items = state.completions(end_of(code));
    let names = labels(&items);
    let pos = |label: &str| names.iter().position(|n| *n == label).unwrap();
    assert!(pos("$limit") < pos("sum"));
    assert!(pos("sum") < pos("helper"));
    assert!(pos("helper") < pos("none"));
    let sum = items.iter().find(|i| i.label == "sum").unwrap();
    assert_eq!(sum.kind, Some(CompletionItemKind::FUNCTION));
    assert!(sum.detail.is_some());
    assert!(names.contains(&"true"));
    assert!(names.contains(&"if"));
}

#[test]
fn test_navigation_direction_completion() {
    let code = "output o navigate ";
    let state = analyze(code).state;
    let items = state.completions(end_of(code));
    assert!(labels(&items).contains(&"descendants"));
    assert!(!labels(&items).contains(&"if"));
}

#[test]
fn test_namespace_completion() {
    let code = "output o us-gaap:";
    let mut input = AnalysisInput::new("file:///main.xule", code);
    input.namespaces = namespaces();
    let state = XuleAnalyzer::new().analyze(input).state;
    let items = state.completions(end_of(code));
    assert_eq!(labels(&items), ["Assets", "Liabilities"]);
    assert!(items.iter().all(|i| i.kind == Some(CompletionItemKind::ENUM_MEMBER)));

    let prefix_only = "namespace ifrs = http://xbrl.ifrs.org/taxonomy\noutput o ";
    let mut input = AnalysisInput::new("file:///main.xule", prefix_only);
    input.namespaces = namespaces();
    let state = XuleAnalyzer::new().analyze(input).state;
    let items = state.completions(end_of(prefix_only));
    let prefixes: Vec<_> = items
        .iter()
        .filter(|i| i.kind == Some(CompletionItemKind::ENUM))
        .map(|i| i.label.as_str())
        .collect();
    assert_eq!(prefixes, ["us-gaap", "ifrs"]);
}

#[test]
fn test_declaration_keywords_in_empty_document() {
    let state = analyze("").state;
    let items = state.completions(Position::new(0, 0));
    let names = labels(&items);
    for keyword in ["assert", "output", "function", "constant", "namespace", "output-attribute"] {
        assert!(names.contains(&keyword), "missing {keyword}");
    }
    assert!(items.iter().all(|i| i.kind == Some(CompletionItemKind::KEYWORD)));
}

#[test]
fn test_completion_labels_are_unique() {
    let code = "constant $c = 1\nfunction f($a) $a\noutput-attribute note\n\
                assert a satisfied $v = 2; {covered @concept = * as $m where $m > $c} + f($v)\n\
                note \"n\"";
    let state = analyze(code).state;
    let rope = &state.unit.primary().text;
    for line in 0..rope.len_lines() {
        let width = rope.line(line).len_chars() as u32;
        for character in 0..=width {
            let items = state.completions(Position::new(line as u32, character));
            let mut seen = HashSet::new();
            for item in &items {
                assert!(seen.insert(item.label.clone()), "duplicate {} at {line}:{character}", item.label);
            }
        }
    }
}

#[test]
fn test_definition_of_function_and_variable() {
    let code = "function twice($v) $v * 2\noutput o\n  $n = 3;\n  twice($n)";
    let result = analyze(code);
    let state = &result.state;

    let target = state.definition(Position::new(3, 3)).unwrap();
    assert_eq!(target.origin, "untitled:document");
    assert_eq!(target.range, Range::new(Position::new(0, 9), Position::new(0, 14)));

    let target = state.definition(Position::new(3, 9)).unwrap();
    assert_eq!(target.range, Range::new(Position::new(2, 2), Position::new(2, 4)));

    assert!(state.definition(Position::new(1, 2)).is_none());
}

#[test]
fn test_definition_with_caret_before_name_after_punctuation() {
    let code = "constant $c = 1\noutput o f($c)";
    let state = analyze(code).state;

    let expected = Range::new(Position::new(0, 9), Position::new(0, 11));
    assert_eq!(state.definition(Position::new(1, 11)).unwrap().range, expected);
    assert_eq!(state.definition(Position::new(1, 12)).unwrap().range, expected);
    assert_eq!(state.definition(Position::new(1, 13)).unwrap().range, expected);
}

#[test]
fn test_unicode_separators_do_not_break_lines() {
    let code = "output o \"a\u{2028}b\u{2029}c\u{85}d\"\noutput p $zz";
    let result = analyze(code);
    assert_eq!(result.diagnostics.len(), 1, "{:?}", result.diagnostics);
    assert_eq!(
        result.diagnostics[0].range,
        Range::new(Position::new(1, 9), Position::new(1, 12))
    );

    let code = "constant $c = \"x\u{2028}y\"\noutput o $c";
    let state = analyze(code).state;
    let target = state.definition(Position::new(1, 10)).unwrap();
    assert_eq!(target.range, Range::new(Position::new(0, 9), Position::new(0, 11)));
}

#[test]
fn test_definition_in_auto_import() {
    let mut input = AnalysisInput::new("file:///main.xule", "output o $rate * 2");
    input.imports.push(LoadedSource {
        origin: "/work/shared.xule".to_string(),
        text: "// shared\nconstant $rate = 0.5".to_string(),
    });
    let result = XuleAnalyzer::new().analyze(input);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    let target = result.state.definition(Position::new(0, 10)).unwrap();
    assert_eq!(target.origin, "/work/shared.xule");
    assert_eq!(target.range, Range::new(Position::new(1, 9), Position::new(1, 14)));
}

#[test]
fn test_refreshed_state_sees_new_text() {
    let state = analyze("output o 1").state;
    let refreshed = state.with_primary_text("constant $fresh = 1\noutput o $fr");
    let items = refreshed.completions(Position::new(1, 12));
    assert!(labels(&items).contains(&"$fresh"));
    assert!(!labels(&state.completions(Position::new(1, 12))).contains(&"$fresh"));
}
