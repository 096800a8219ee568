//! Leaf watch registration
//!
//! Walks the mirrored subtree a second time to discover its leaves and keeps
//! one [`ChangeReactor`] task alive per leaf. Every reactor holds a child
//! token of the registry's root [`CancellationToken`], so the whole watcher
//! fleet can be stopped through [`WatchRegistry::shutdown`].
//!
//! The watched-leaf set is fixed at registration time: structural changes in
//! the store (a leaf gaining children, a new leaf appearing) are not
//! detected afterwards - only value changes on already-known leaves trigger
//! reactions. This is a documented limitation, not an accident.

mod reactor;

pub(crate) use reactor::*;

#[cfg(test)]
mod watch_test;

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::tree::join_path;
use crate::Result;
use crate::SyncContext;
use crate::TraversalError;

/// Registry of active leaf watchers, keyed by leaf path.
pub struct WatchRegistry {
    watchers: DashMap<String, WatchHandle>,
    root_token: CancellationToken,
}

pub(crate) struct WatchHandle {
    #[allow(dead_code)]
    token: CancellationToken,
    #[allow(dead_code)]
    task: JoinHandle<()>,
}

impl WatchRegistry {
    pub(crate) fn new() -> Self {
        Self {
            watchers: DashMap::new(),
            root_token: CancellationToken::new(),
        }
    }

    /// Discover every leaf under the context's root path and start one
    /// reactor per leaf.
    ///
    /// A listing failure on the root aborts registration entirely. Below the
    /// root, a branch whose listing fails is logged and skipped - watchers on
    /// branches already discovered keep running.
    ///
    /// # Errors
    /// [`TraversalError`] when the root listing fails.
    pub(crate) async fn register_all(
        &self,
        ctx: &Arc<SyncContext>,
    ) -> Result<()> {
        let root_path = ctx.root_path();
        let children = ctx
            .client()
            .children(root_path)
            .await
            .map_err(|e| TraversalError::child_listing(root_path, e))?;

        for child in children {
            self.register_subtree(ctx, join_path(root_path, &child)).await;
        }

        debug!(
            "registered {} leaf watcher(s) under {}",
            self.watchers.len(),
            root_path
        );
        Ok(())
    }

    fn register_subtree<'a>(
        &'a self,
        ctx: &'a Arc<SyncContext>,
        path: String,
    ) -> BoxFuture<'a, ()> {
        async move {
            match ctx.client().children(&path).await {
                Err(e) => {
                    warn!("skipping branch {}: listing children failed: {}", path, e);
                }
                Ok(children) if children.is_empty() => {
                    self.spawn_reactor(ctx, path);
                }
                Ok(children) => {
                    for child in children {
                        self.register_subtree(ctx, join_path(&path, &child)).await;
                    }
                }
            }
        }
        .boxed()
    }

    fn spawn_reactor(
        &self,
        ctx: &Arc<SyncContext>,
        path: String,
    ) {
        let token = self.root_token.child_token();
        let reactor = ChangeReactor::new(path.clone(), ctx.clone(), token.clone());
        let task = tokio::spawn(reactor.run());
        self.watchers.insert(path, WatchHandle { token, task });
    }

    /// Paths of all currently watched leaves.
    pub fn watched_paths(&self) -> Vec<String> {
        self.watchers.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn contains(
        &self,
        path: &str,
    ) -> bool {
        self.watchers.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    /// Cancel every reactor. Tasks finish their current pass and exit.
    pub fn shutdown(&self) {
        self.root_token.cancel();
    }
}
