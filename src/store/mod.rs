//! Store client seam
//!
//! The hierarchical store itself (connect, authenticate, list children,
//! fetch values, fetch-with-watch) is an external capability. This module
//! defines the trait the rest of the crate works against; adapters for a
//! concrete store implement it and map their connection and authentication
//! failures onto [`crate::ConnectionError`].

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::Result;

/// One-shot change subscription for a single node.
///
/// The store delivers at most one event per registration, so a watcher must
/// call [`StoreClient::get_with_watch`] again after every fire to keep
/// watching.
pub type WatchSubscription = oneshot::Receiver<WatchEvent>;

/// A change notification delivered through a [`WatchSubscription`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// Path of the node the watch was registered on
    pub path: String,
    /// What happened to the node
    pub kind: WatchEventKind,
}

/// The store's event vocabulary for node watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Created,
    Deleted,
    DataChanged,
    ChildrenChanged,
}

/// Client handle onto the hierarchical store.
///
/// Implementations are expected to already be connected and authenticated;
/// the five connection parameters live in [`crate::ConnectionConfig`] and are
/// consumed by the adapter, not by this crate.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StoreClient: Send + Sync + 'static {
    /// List the names of the direct children of `path`.
    ///
    /// An empty list means the node is a leaf.
    async fn children(
        &self,
        path: &str,
    ) -> Result<Vec<String>>;

    /// Fetch the raw value stored at `path`.
    async fn get_value(
        &self,
        path: &str,
    ) -> Result<String>;

    /// Fetch the value at `path` and register a one-shot change watch on it.
    async fn get_with_watch(
        &self,
        path: &str,
    ) -> Result<(String, WatchSubscription)>;
}
