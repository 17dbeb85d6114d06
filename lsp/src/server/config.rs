use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tower_lsp::Client;
use tower_lsp::lsp_types::{ConfigurationItem, Url};
use tracing::warn;

use crate::analyzer::CheckSettings;

pub(crate) const CONFIG_SECTION: &str = "xule";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum DebugLevel {
    #[default]
    Off,
    Verbose,
}

/// The `xule` configuration section as sent by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct XuleSettings {
    #[serde(default)]
    pub(crate) server: ServerSection,
    #[serde(default)]
    checks: ChecksSection,
    #[serde(default)]
    pub(crate) namespaces: NamespacesSection,
    #[serde(default)]
    pub(crate) auto_imports: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServerSection {
    #[serde(default)]
    pub(crate) debug: DebugLevel,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChecksSection {
    #[serde(default)]
    functions: Option<bool>,
    #[serde(default)]
    properties: Option<bool>,
    #[serde(default)]
    variables: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NamespacesSection {
    #[serde(default)]
    pub(crate) definitions: Vec<String>,
}

impl XuleSettings {
    pub(crate) fn from_value(value: serde_json::Value) -> anyhow::Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).context("invalid `xule` settings")
    }

    pub(crate) fn checks(&self) -> CheckSettings {
        CheckSettings {
            functions: self.checks.functions.unwrap_or(true),
            properties: self.checks.properties.unwrap_or(true),
            variables: self.checks.variables.unwrap_or(true),
        }
    }

    pub(crate) fn verbose(&self) -> bool {
        self.server.debug == DebugLevel::Verbose
    }
}

/// Settings scoped to `scope_uri`. Falls back to defaults when the client
/// has none or sends something unreadable.
pub(crate) async fn fetch_settings(client: &Client, scope_uri: &Url) -> XuleSettings {
    let items = vec![ConfigurationItem {
        scope_uri: Some(scope_uri.clone()),
        section: Some(CONFIG_SECTION.to_string()),
    }];
    let value = match client.configuration(items).await {
        Ok(values) => values.into_iter().next().unwrap_or_default(),
        Err(e) => {
            warn!("workspace/configuration failed: {e}");
            return XuleSettings::default();
        }
    };
    XuleSettings::from_value(value).unwrap_or_else(|e| {
        warn!("{e:#}");
        XuleSettings::default()
    })
}

/// Relative paths resolve against the workspace root, else the folder of
/// the document.
pub(crate) fn resolve_paths(paths: &[String], workspace_root: Option<&Path>, document: &Url) -> Vec<PathBuf> {
    let document_dir = document
        .to_file_path()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));
    let base = workspace_root.map(Path::to_path_buf).or(document_dir);
    paths
        .iter()
        .map(PathBuf::from)
        .map(|p| match (&base, p.is_absolute()) {
            (Some(base), false) => base.join(p),
            _ => p,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_defaults_when_absent() {
        let settings = XuleSettings::from_value(serde_json::Value::Null).unwrap();
        assert_eq!(settings.checks(), CheckSettings::default());
        assert!(!settings.verbose());
        assert!(settings.auto_imports.is_empty());
    }

    #[test]
    fn test_settings_camel_case_sections() {
        let settings = XuleSettings::from_value(json!({
            "server": { "debug": "verbose" },
            "checks": { "properties": false },
            "namespaces": { "definitions": ["ns/gaap.json"] },
            "autoImports": ["shared.xule"]
        }))
        .unwrap();
        assert!(settings.verbose());
        let checks = settings.checks();
        assert!(checks.functions);
        assert!(!checks.properties);
        assert!(checks.variables);
        assert_eq!(settings.namespaces.definitions, vec!["ns/gaap.json"]);
        assert_eq!(settings.auto_imports, vec!["shared.xule"]);
    }

    #[test]
    fn test_settings_reject_unknown_debug_level() {
        let err = XuleSettings::from_value(json!({ "server": { "debug": "loud" } })).unwrap_err();
        assert!(format!("{err:#}").contains("xule"));
    }

    #[test]
    fn test_resolve_paths_prefers_workspace_root() {
        let doc = Url::parse("file:///work/rules/main.xule").unwrap();
        let paths = vec!["shared.xule".to_string(), "/abs/other.xule".to_string()];

        let resolved = resolve_paths(&paths, Some(Path::new("/work")), &doc);
        assert_eq!(
            resolved,
            vec![PathBuf::from("/work/shared.xule"), PathBuf::from("/abs/other.xule")]
        );

        let resolved = resolve_paths(&paths, None, &doc);
        assert_eq!(resolved[0], PathBuf::from("/work/rules/shared.xule"));
    }
}
