use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::task;
use tokio::time::{Duration, sleep};
use tower_lsp::Client;
use tower_lsp::lsp_types::{MessageType, Url};
use tracing::{debug, error};

use crate::analyzer::{AnalysisInput, DocumentState, XuleAnalyzer, load_namespace_files, load_sources};

use super::config::{fetch_settings, resolve_paths};
use super::state::{Document, XuleLanguageServer};
use super::utils::compute_content_hash;

struct Snapshot {
    text: String,
    version: i32,
    seq: u64,
    hash: u64,
}

impl XuleLanguageServer {
    /// Validate `uri` after `delay_ms` on a background task. Edits arriving
    /// in the meantime bump the sequence number and make this pass stale.
    pub(crate) fn schedule_validation(&self, uri: Url, delay_ms: u64) {
        let client = self.client.clone();
        let documents = self.documents.clone();
        let workspace_root = self.workspace_root.get().cloned();
        tokio::spawn(async move {
            sleep(Duration::from_millis(delay_ms)).await;
            validate(&client, &documents, &uri, workspace_root).await;
        });
    }
}

async fn validate(client: &Client, documents: &DashMap<Url, Document>, uri: &Url, workspace_root: Option<PathBuf>) {
    let Some(snapshot) = take_snapshot(documents, uri) else {
        return;
    };
    let started = Instant::now();

    let settings = fetch_settings(client, uri).await;
    let root = workspace_root.as_deref();
    let import_paths = resolve_paths(&settings.auto_imports, root, uri);
    let primary_path = uri.to_file_path().ok();
    let imports = load_sources(&import_paths, primary_path.as_deref()).await;
    let namespace_paths = resolve_paths(&settings.namespaces.definitions, root, uri);
    let namespaces = load_namespace_files(&namespace_paths).await;
    let loaded = started.elapsed();

    let input = AnalysisInput {
        origin: uri.to_string(),
        text: snapshot.text,
        imports,
        namespaces,
    };
    let analyzer = XuleAnalyzer::with_checks(settings.checks());
    let result = match task::spawn_blocking(move || analyzer.analyze(input)).await {
        Ok(result) => result,
        Err(e) => {
            error!("validation of {uri} failed: {e}");
            return;
        }
    };

    if !commit_if_current(documents, uri, snapshot.seq, snapshot.hash, result.state) {
        debug!("dropping stale validation of {uri} (seq {})", snapshot.seq);
        return;
    }
    let diagnostics = result.diagnostics.len();
    client
        .publish_diagnostics(uri.clone(), result.diagnostics, Some(snapshot.version))
        .await;

    if settings.verbose() {
        let message = format!(
            "validated {uri} v{}: {diagnostics} diagnostics, load {:?}, total {:?}",
            snapshot.version,
            loaded,
            started.elapsed()
        );
        client.log_message(MessageType::LOG, message).await;
    }
}

/// Current text of the document, or `None` when it is closed or its
/// committed state already matches the text.
fn take_snapshot(documents: &DashMap<Url, Document>, uri: &Url) -> Option<Snapshot> {
    let doc = documents.get(uri)?;
    let text = doc.content.to_string();
    let hash = compute_content_hash(&text);
    if doc.cached.is_some() && doc.analyzed_hash == Some(hash) {
        debug!("skipping validation of {uri}: content unchanged");
        return None;
    }
    Some(Snapshot {
        text,
        version: doc.version,
        seq: doc.debounce_seq,
        hash,
    })
}

/// Store `state` as the document's cached state unless a newer edit arrived
/// while it was computed. Returns whether it was stored.
pub(crate) fn commit_if_current(
    documents: &DashMap<Url, Document>,
    uri: &Url,
    seq: u64,
    hash: u64,
    state: Arc<DocumentState>,
) -> bool {
    let Some(mut doc) = documents.get_mut(uri) else {
        return false;
    };
    if doc.debounce_seq != seq {
        return false;
    }
    doc.cached = Some(state);
    doc.analyzed_hash = Some(hash);
    true
}
