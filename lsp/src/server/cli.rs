use anyhow::Context;
use std::path::{Component, Path, PathBuf};

use tower_lsp::lsp_types::DiagnosticSeverity;

use crate::analyzer::{AnalysisInput, AnalysisResult, XuleAnalyzer, load_sources};

const USAGE: &str = "Usage: xule-lsp --analyze [--errors-only] [--import <file>]... <relative-file-path>\n  --analyze <file>     : Full analysis with JSON output\n  --errors-only        : Show only errors in simple format\n  --import <file>      : Merge another rule file into the compilation unit";

#[derive(Debug, Default, PartialEq, Eq)]
struct AnalyzeArgs {
    path: String,
    errors_only: bool,
    imports: Vec<String>,
}

/// Runs `--analyze` when present on the command line and returns what to
/// print. `None` means start the language server.
pub(crate) async fn try_cli_analyze() -> anyhow::Result<Option<String>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(args) = parse_args(&args)? else {
        return Ok(None);
    };

    let content = read_file_content(&args.path)?;
    for import in &args.imports {
        if !is_safe_path(import) {
            return Err(anyhow::anyhow!("Unsafe file path: {}", import));
        }
    }
    let import_paths: Vec<PathBuf> = args.imports.iter().map(PathBuf::from).collect();
    let imports = load_sources(&import_paths, Some(Path::new(&args.path))).await;

    let mut input = AnalysisInput::new(args.path.clone(), content);
    input.imports = imports;
    let analysis = XuleAnalyzer::new().analyze(input);

    if args.errors_only {
        return Ok(Some(format_errors(&analysis)));
    }
    Ok(Some(serde_json::to_string_pretty(&analysis_json(&analysis))?))
}

fn parse_args(args: &[String]) -> anyhow::Result<Option<AnalyzeArgs>> {
    if !args.iter().any(|a| a == "--analyze") {
        return Ok(None);
    }
    let mut parsed = AnalyzeArgs::default();
    let mut path = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--analyze" => {}
            "--errors-only" => parsed.errors_only = true,
            "--import" => {
                let file = iter.next().ok_or_else(|| anyhow::anyhow!(USAGE))?;
                parsed.imports.push(file.clone());
            }
            other if other.starts_with("--") => {}
            other => path = Some(other.to_string()),
        }
    }
    parsed.path = path.ok_or_else(|| anyhow::anyhow!(USAGE))?;
    Ok(Some(parsed))
}

fn format_errors(analysis: &AnalysisResult) -> String {
    let errors: Vec<String> = analysis
        .diagnostics
        .iter()
        .filter(|d| d.severity == Some(DiagnosticSeverity::ERROR))
        .map(|d| {
            format!(
                "Line {}:{}: {}",
                d.range.start.line + 1,
                d.range.start.character + 1,
                d.message
            )
        })
        .collect();
    if errors.is_empty() {
        "No errors found".to_string()
    } else {
        errors.join("\n")
    }
}

fn analysis_json(analysis: &AnalysisResult) -> serde_json::Value {
    let state = &analysis.state;
    let symbols: Vec<serde_json::Value> = state
        .symbols
        .global()
        .bindings
        .iter()
        .map(|b| {
            serde_json::json!({
                "name": b.name,
                "kind": b.kind,
                "origin": state.unit.origin_of(b.declared_at),
            })
        })
        .collect();
    serde_json::json!({
        "diagnostics": analysis.diagnostics,
        "symbols": symbols,
        "namespaces": state.namespaces.prefixes(),
    })
}

pub(crate) fn is_safe_path(path: &str) -> bool {
    let path = Path::new(path);

    if path.as_os_str().is_empty() || path.is_absolute() {
        return false;
    }
    if path.components().any(|c| c == Component::ParentDir) {
        return false;
    }

    let s = path.to_string_lossy();
    let suspicious = ['\0', '\n', '\r', '\t'];
    if s.chars().any(|c| suspicious.contains(&c)) {
        return false;
    }
    // Windows drive prefixes such as `C:`.
    !(s.len() >= 2 && s.as_bytes()[1] == b':')
}

pub(crate) fn read_file_content(path: &str) -> anyhow::Result<String> {
    if !is_safe_path(path) {
        return Err(anyhow::anyhow!("Unsafe file path: {}", path));
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read rule file '{}'", path))
}
