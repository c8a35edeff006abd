//! Memoized resolution keyed by normalized path
//!
//! A cache is bound to one [`FragmentStore`]. Replacing the fragment
//! sequence means building a new cache, which drops every entry at once.

use crate::merge::{Merger, Resolution};
use crate::store::FragmentStore;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Concurrent path-to-resolution cache over a fixed fragment store
#[derive(Debug)]
pub struct ResolutionCache {
    store: Arc<FragmentStore>,
    entries: DashMap<PathBuf, Resolution>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    pub fn new(store: Arc<FragmentStore>) -> Self {
        Self {
            store,
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &Arc<FragmentStore> {
        &self.store
    }

    /// Return the cached resolution for `path`, merging on first request.
    ///
    /// The merge for a missing key runs under that key's entry lock, so each
    /// path is computed at most once per cache.
    pub fn get_or_compute(&self, path: impl AsRef<Path>) -> Resolution {
        let normalized = self.store.matcher().normalize(path);

        if let Some(hit) = self.entries.get(normalized.key()).map(|e| e.value().clone()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return hit;
        }

        match self.entries.entry(normalized.key().to_path_buf()) {
            Entry::Occupied(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let resolution = Merger::new(&self.store).merge_normalized(&normalized);
                entry.insert(resolution.clone());
                resolution
            }
        }
    }

    /// Cached resolution for `path`, without computing
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Resolution> {
        let normalized = self.store.matcher().normalize(path);
        self.entries
            .get(normalized.key())
            .map(|entry| entry.value().clone())
    }

    /// Drop every entry
    pub fn clear(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        debug!("Cleared {} cached resolution(s)", dropped);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
