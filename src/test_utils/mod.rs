//! the test_utils folder here will share utils or test components between
//! unit tests and integration tests

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::ConnectionError;
use crate::Error;
use crate::Result;
use crate::StoreClient;
use crate::WatchEvent;
use crate::WatchEventKind;
use crate::WatchSubscription;

/// In-memory hierarchical store for tests.
///
/// Leaves are `path -> value` entries; internal nodes are implied by path
/// segments. Watches are one-shot senders drained by [`fire`](Self::fire).
/// Paths can be marked broken so their child listing fails, to simulate
/// authorization mistakes.
pub struct InMemoryStore {
    leaves: Mutex<BTreeMap<String, String>>,
    watchers: Mutex<HashMap<String, Vec<oneshot::Sender<WatchEvent>>>>,
    broken: Mutex<BTreeSet<String>>,
}

impl InMemoryStore {
    pub fn new(leaves: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            leaves: Mutex::new(
                leaves
                    .iter()
                    .map(|(path, value)| (path.to_string(), value.to_string()))
                    .collect(),
            ),
            watchers: Mutex::new(HashMap::new()),
            broken: Mutex::new(BTreeSet::new()),
        })
    }

    pub fn set_leaf(
        &self,
        path: &str,
        value: &str,
    ) {
        self.leaves
            .lock()
            .unwrap()
            .insert(path.to_string(), value.to_string());
    }

    pub fn remove_leaf(
        &self,
        path: &str,
    ) {
        self.leaves.lock().unwrap().remove(path);
    }

    /// Make `children(path)` fail from now on.
    pub fn break_path(
        &self,
        path: &str,
    ) {
        self.broken.lock().unwrap().insert(path.to_string());
    }

    /// Deliver a change event to every watcher armed on `path`.
    ///
    /// Returns the number of watchers that actually received it.
    pub fn fire(
        &self,
        path: &str,
        kind: WatchEventKind,
    ) -> usize {
        let senders = self
            .watchers
            .lock()
            .unwrap()
            .remove(path)
            .unwrap_or_default();
        senders
            .into_iter()
            .map(|sender| {
                sender.send(WatchEvent {
                    path: path.to_string(),
                    kind,
                })
            })
            .filter(std::result::Result::is_ok)
            .count()
    }

    /// Number of one-shot subscriptions currently armed on `path`.
    pub fn armed_count(
        &self,
        path: &str,
    ) -> usize {
        self.watchers
            .lock()
            .unwrap()
            .get(path)
            .map_or(0, Vec::len)
    }

    /// Poll until at least one subscription is armed on `path`.
    pub async fn wait_until_armed(
        &self,
        path: &str,
    ) {
        for _ in 0..200 {
            if self.armed_count(path) > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no watcher armed on {path} in time");
    }

    fn child_names(
        &self,
        path: &str,
    ) -> Vec<String> {
        let prefix = if path == "/" {
            "/".to_string()
        } else {
            format!("{}/", path)
        };
        let leaves = self.leaves.lock().unwrap();
        let names: BTreeSet<String> = leaves
            .keys()
            .filter_map(|leaf| leaf.strip_prefix(&prefix))
            .map(|rest| rest.split('/').next().unwrap_or(rest).to_string())
            .collect();
        names.into_iter().collect()
    }
}

#[async_trait]
impl StoreClient for InMemoryStore {
    async fn children(
        &self,
        path: &str,
    ) -> Result<Vec<String>> {
        if self.broken.lock().unwrap().contains(path) {
            return Err(ConnectionError::SessionLost.into());
        }
        Ok(self.child_names(path))
    }

    async fn get_value(
        &self,
        path: &str,
    ) -> Result<String> {
        self.leaves
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Fatal(format!("no value stored at {path}")))
    }

    async fn get_with_watch(
        &self,
        path: &str,
    ) -> Result<(String, WatchSubscription)> {
        let value = self.get_value(path).await?;
        let (tx, rx) = oneshot::channel();
        self.watchers
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push(tx);
        Ok((value, rx))
    }
}

/// Poll `cond` until it holds, panicking after a generous deadline.
pub async fn wait_until<F>(
    what: &str,
    cond: F,
) where
    F: Fn() -> bool,
{
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {what}");
}
