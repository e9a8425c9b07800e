//! Document Corpus Port - Read access to the project's reference documents.
//!
//! The corpus is owned elsewhere (a document store or file share). The core
//! only lists entry names and metadata to pick a retrieval source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One document available for retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    /// Entry name, quoted verbatim when cited.
    pub name: String,
    /// Free-form metadata (revision, discipline, description).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl CorpusEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Errors from the corpus backend.
#[derive(Debug, Clone, Error)]
pub enum CorpusError {
    #[error("corpus unavailable: {0}")]
    Unavailable(String),

    #[error("corpus listing malformed: {0}")]
    Malformed(String),
}

/// Port for listing reference documents.
#[async_trait]
pub trait DocumentCorpus: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<CorpusEntry>, CorpusError>;
}
