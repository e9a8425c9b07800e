//! Cached Document Corpus Adapter
//!
//! Wraps another corpus and serves its listing from memory until the TTL
//! expires or `invalidate` is called.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::ports::{CorpusEntry, CorpusError, DocumentCorpus};

#[derive(Debug, Clone)]
struct CachedListing {
    entries: Vec<CorpusEntry>,
    fetched_at: Instant,
}

/// TTL cache in front of a [`DocumentCorpus`].
///
/// Errors are not cached.
pub struct CachedCorpus {
    inner: Arc<dyn DocumentCorpus>,
    ttl: Duration,
    listing: RwLock<Option<CachedListing>>,
}

impl CachedCorpus {
    pub fn new(inner: Arc<dyn DocumentCorpus>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            listing: RwLock::new(None),
        }
    }

    /// Drops the cached listing so the next call refetches.
    pub async fn invalidate(&self) {
        *self.listing.write().await = None;
    }

    fn fresh(&self, listing: &CachedListing) -> bool {
        listing.fetched_at.elapsed() < self.ttl
    }
}

#[async_trait]
impl DocumentCorpus for CachedCorpus {
    async fn list_documents(&self) -> Result<Vec<CorpusEntry>, CorpusError> {
        if let Some(listing) = self.listing.read().await.as_ref() {
            if self.fresh(listing) {
                return Ok(listing.entries.clone());
            }
        }

        let mut slot = self.listing.write().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(listing) = slot.as_ref() {
            if self.fresh(listing) {
                return Ok(listing.entries.clone());
            }
        }

        let entries = self.inner.list_documents().await?;
        debug!(count = entries.len(), "corpus listing refreshed");
        *slot = Some(CachedListing {
            entries: entries.clone(),
            fetched_at: Instant::now(),
        });
        Ok(entries)
    }
}
