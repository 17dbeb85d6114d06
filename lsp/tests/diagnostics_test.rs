use tower_lsp::lsp_types::{DiagnosticSeverity, NumberOrString, Position, Range};
use xule_lsp::analyzer::{CheckSettings, XuleAnalyzer, checker::DIAGNOSTIC_SOURCE};

#[test]
fn test_unknown_variable_points_at_reference() {
    let code = "constant $a = 1\noutput o $a + $b";
    let result = XuleAnalyzer::new().analyze_text(code);

    assert_eq!(result.diagnostics.len(), 1, "{:?}", result.diagnostics);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(diagnostic.source.as_deref(), Some(DIAGNOSTIC_SOURCE));
    assert_eq!(diagnostic.code, Some(NumberOrString::String("unknown-variable".to_string())));
    assert_eq!(diagnostic.message, "Unknown variable '$b'");
    assert_eq!(diagnostic.range, Range::new(Position::new(1, 14), Position::new(1, 16)));
}

#[test]
fn test_ranges_are_utf16() {
    let code = "output o \"😀\" + $t";
    let result = XuleAnalyzer::new().analyze_text(code);

    assert_eq!(result.diagnostics.len(), 1, "{:?}", result.diagnostics);
    assert_eq!(
        result.diagnostics[0].range,
        Range::new(Position::new(0, 16), Position::new(0, 18))
    );
}

#[test]
fn test_syntax_error_is_reported_and_checks_continue() {
    let code = "assert a satisfied 1 + ) junk\noutput p $missing";
    let result = XuleAnalyzer::new().analyze_text(code);

    let syntax: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.code == Some(NumberOrString::String("syntax-error".to_string())))
        .collect();
    assert!(!syntax.is_empty());
    assert!(syntax.iter().all(|d| d.severity == Some(DiagnosticSeverity::ERROR)));
    assert!(result.diagnostics.iter().any(|d| d.message == "Unknown variable '$missing'"));
}

#[test]
fn test_disabled_checks_report_nothing() {
    let code = "output o undefined_fn($nope).no-such-property";
    let checks = CheckSettings {
        functions: false,
        properties: false,
        variables: false,
    };
    let result = XuleAnalyzer::with_checks(checks).analyze_text(code);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);

    let result = XuleAnalyzer::new().analyze_text(code);
    assert_eq!(result.diagnostics.len(), 3, "{:?}", result.diagnostics);
}

#[test]
fn test_stray_closing_brace_single_diagnostic() {
    let result = XuleAnalyzer::new().analyze_text("output o }");
    assert_eq!(result.diagnostics.len(), 1, "{:?}", result.diagnostics);
    assert!(result.diagnostics[0].message.contains("Extraneous"));
    assert_eq!(result.diagnostics[0].range, Range::new(Position::new(0, 9), Position::new(0, 10)));
}
