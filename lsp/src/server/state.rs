use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use ropey::Rope;
use tower_lsp::Client;
use tower_lsp::lsp_types::Url;

use crate::analyzer::DocumentState;

use super::utils::compute_content_hash;

static NEXT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Validation sequence number, unique across all documents for the life of
/// the process. A reopened document never reuses a number an in-flight pass
/// from before the close still holds.
pub(crate) fn next_seq() -> u64 {
    NEXT_SEQ.fetch_add(1, Ordering::Relaxed)
}

/// An open XULE document and the state of its last committed validation.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
    /// Restamped from [`next_seq`] on open, every edit and every forced
    /// revalidation; a pass only commits while it still matches.
    pub(crate) debounce_seq: u64,
    /// Hash of the text `cached` was computed from.
    pub(crate) analyzed_hash: Option<u64>,
    pub(crate) cached: Option<Arc<DocumentState>>,
}

impl Document {
    pub(crate) fn new(text: &str, version: i32) -> Self {
        Self {
            content: Rope::from_str(text),
            version,
            debounce_seq: next_seq(),
            ..Default::default()
        }
    }
}

pub(crate) struct XuleLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DashMap<Url, Document>>,
    pub(crate) workspace_root: Arc<OnceCell<PathBuf>>,
}

impl XuleLanguageServer {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            workspace_root: Arc::new(OnceCell::new()),
        }
    }

    /// State to answer a request with. When the buffer moved on since the
    /// last committed pass, the primary file is reparsed against the cached
    /// imports without touching the cache.
    pub(crate) fn request_state(&self, uri: &Url) -> Option<Arc<DocumentState>> {
        let (cached, analyzed_hash, text) = {
            let doc = self.documents.get(uri)?;
            (doc.cached.clone()?, doc.analyzed_hash, doc.content.to_string())
        };
        if analyzed_hash == Some(compute_content_hash(&text)) {
            return Some(cached);
        }
        Some(Arc::new(cached.with_primary_text(&text)))
    }
}
