//! In-Memory Document Corpus Adapter
//!
//! Holds corpus entries in memory. Used by the binary (names from the
//! environment) and by tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{CorpusEntry, CorpusError, DocumentCorpus};

/// In-memory document corpus
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    entries: Arc<RwLock<Vec<CorpusEntry>>>,
    unavailable: Arc<RwLock<Option<String>>>,
    list_calls: Arc<AtomicUsize>,
}

impl InMemoryCorpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a corpus from bare entry names
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_entries(names.into_iter().map(CorpusEntry::new))
    }

    pub fn with_entries(entries: impl IntoIterator<Item = CorpusEntry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries.into_iter().collect())),
            ..Self::default()
        }
    }

    /// Add an entry, replacing any entry with the same name
    pub async fn insert(&self, entry: CorpusEntry) {
        let mut entries = self.entries.write().await;
        entries.retain(|e| e.name != entry.name);
        entries.push(entry);
    }

    pub async fn remove(&self, name: &str) {
        self.entries.write().await.retain(|e| e.name != name);
    }

    /// Make every listing fail with `message` (for resilience tests)
    pub async fn set_unavailable(&self, message: Option<String>) {
        *self.unavailable.write().await = message;
    }

    /// Number of `list_documents` calls served
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentCorpus for InMemoryCorpus {
    async fn list_documents(&self) -> Result<Vec<CorpusEntry>, CorpusError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.unavailable.read().await.clone() {
            return Err(CorpusError::Unavailable(message));
        }
        Ok(self.entries.read().await.clone())
    }
}
