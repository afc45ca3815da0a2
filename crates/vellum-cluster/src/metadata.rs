//! Read-mostly cluster metadata cache
//!
//! The watcher on the external coordination store builds a fresh
//! [`ClusterView`] whenever anything changes and installs it atomically;
//! readers always see either the complete old view or the complete new one.
//! The revision counter only moves forward, so callers can detect staleness
//! and retry.

// this_file: crates/vellum-cluster/src/metadata.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use vellum_core::CollectionInfo;

/// Source of cluster-wide unique numbers
///
/// In a real deployment this is fed by the external coordination store's
/// allocator; [`LocalUniqueIdSource`] is the single-process stand-in.
pub trait UniqueIdSource: Send + Sync {
    fn next_id(&self) -> u64;
}

/// Process-local unique-id source backed by an atomic counter
#[derive(Debug)]
pub struct LocalUniqueIdSource {
    next: AtomicU64,
}

impl LocalUniqueIdSource {
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl Default for LocalUniqueIdSource {
    fn default() -> Self {
        Self::new(1)
    }
}

impl UniqueIdSource for LocalUniqueIdSource {
    fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// One consistent snapshot of all collections, keyed by database and name
#[derive(Debug, Default, Clone)]
pub struct ClusterView {
    collections: HashMap<(String, String), Arc<CollectionInfo>>,
}

impl ClusterView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, database: impl Into<String>, info: CollectionInfo) -> Self {
        self.collections
            .insert((database.into(), info.name.clone()), Arc::new(info));
        self
    }

    pub fn collection(&self, database: &str, name: &str) -> Option<Arc<CollectionInfo>> {
        self.collections
            .get(&(database.to_owned(), name.to_owned()))
            .cloned()
    }
}

/// The coordinator's view of the cluster
pub struct ClusterMetadata {
    view: RwLock<Arc<ClusterView>>,
    revision: AtomicU64,
    transactions: AtomicU64,
    ids: Arc<dyn UniqueIdSource>,
}

impl ClusterMetadata {
    pub fn new(ids: Arc<dyn UniqueIdSource>) -> Self {
        Self {
            view: RwLock::new(Arc::new(ClusterView::new())),
            revision: AtomicU64::new(0),
            transactions: AtomicU64::new(0),
            ids,
        }
    }

    /// Metadata cache with a process-local id source, for single-node use
    /// and tests
    pub fn new_local() -> Self {
        Self::new(Arc::new(LocalUniqueIdSource::default()))
    }

    /// Atomically replace the cached view, bumping the revision
    pub fn install_view(&self, view: ClusterView) -> u64 {
        *self.view.write() = Arc::new(view);
        self.revision.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Monotonically increasing view revision
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn get_collection(&self, database: &str, name: &str) -> Option<Arc<CollectionInfo>> {
        self.view.read().collection(database, name)
    }

    /// A number unique across the whole cluster
    pub fn unique_id(&self) -> u64 {
        self.ids.next_id()
    }

    /// A transaction id unique within this coordinator
    pub fn new_transaction_id(&self) -> u64 {
        self.transactions.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl std::fmt::Debug for ClusterMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterMetadata")
            .field("revision", &self.revision())
            .finish()
    }
}
