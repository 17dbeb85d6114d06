use tokio::task;
use tower_lsp::LanguageServer;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tracing::{debug, error, info};

use super::state::{Document, XuleLanguageServer, next_seq};

const OPEN_DELAY_MS: u64 = 150;
const CHANGE_DELAY_MS: u64 = 250;

#[tower_lsp::async_trait]
impl LanguageServer for XuleLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("XULE Language Server initializing with root: {:?}", params.root_uri);

        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| folder.uri.clone())
            .or(params.root_uri)
            .and_then(|uri| uri.to_file_path().ok());
        if let Some(root) = root {
            let _ = self.workspace_root.set(root);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(true),
                    trigger_characters: Some([".", ":", "$", "@"].iter().map(|c| c.to_string()).collect()),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                definition_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "xule-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("XULE Language Server initialized");
        self.client
            .log_message(MessageType::INFO, "XULE Language Server started")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("XULE Language Server shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        let uris: Vec<Url> = self
            .documents
            .iter_mut()
            .map(|mut entry| {
                entry.analyzed_hash = None;
                entry.debounce_seq = next_seq();
                entry.key().clone()
            })
            .collect();
        debug!("configuration changed, revalidating {} documents", uris.len());
        for uri in uris {
            self.schedule_validation(uri, 0);
        }
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.documents
            .insert(doc.uri.clone(), Document::new(&doc.text, doc.version));
        self.schedule_validation(doc.uri, OPEN_DELAY_MS);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        // Full sync: the last change carries the whole text.
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        {
            let mut entry = self.documents.entry(uri.clone()).or_default();
            entry.version = params.text_document.version;
            entry.content = ropey::Rope::from_str(&change.text);
            entry.debounce_seq = next_seq();
        }
        self.schedule_validation(uri, CHANGE_DELAY_MS);
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let Some(state) = self.request_state(uri) else {
            return Ok(Some(CompletionResponse::Array(Vec::new())));
        };
        let items = task::spawn_blocking(move || state.completions(position))
            .await
            .unwrap_or_else(|e| {
                error!("completion failed: {e}");
                Vec::new()
            });
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn completion_resolve(&self, item: CompletionItem) -> Result<CompletionItem> {
        Ok(item)
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some(state) = self.request_state(uri) else {
            return Ok(None);
        };
        let Some(target) = state.definition(position) else {
            return Ok(None);
        };
        let target_uri = Url::parse(&target.origin)
            .ok()
            .or_else(|| Url::from_file_path(&target.origin).ok());
        Ok(target_uri.map(|uri| GotoDefinitionResponse::Scalar(Location::new(uri, target.range))))
    }
}
