//! Mirror engine
//!
//! Glues the passes together: materialize the subtree, publish the document,
//! load the snapshot, then keep one reactor per leaf re-running the whole
//! sequence on every change event.
//!
//! ## Example
//! ```rust,ignore
//! let config = MirrorConfig::load("zk-mirror")?;
//! let mirror = ZkMirror::builder(config).store(client).build()?;
//! mirror.start().await?;
//!
//! let version = mirror.snapshot().get_string("version")?;
//! ```

mod builder;

pub use builder::*;

#[cfg(test)]
mod mirror_test;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::DocumentWriter;
use crate::MirrorConfig;
use crate::Result;
use crate::SnapshotStore;
use crate::StoreClient;
use crate::TreeMaterializer;
use crate::WatchRegistry;

/// Shared state of one mirror: the store client, the two passes and the
/// snapshot they feed, plus the gate that serializes rebuilds.
pub struct SyncContext {
    client: Arc<dyn StoreClient>,
    root_path: String,
    materializer: TreeMaterializer,
    writer: DocumentWriter,
    snapshot: Arc<SnapshotStore>,
    rebuild_gate: Mutex<()>,
}

impl SyncContext {
    pub(crate) fn new(
        client: Arc<dyn StoreClient>,
        root_path: String,
        output_base: impl Into<std::path::PathBuf>,
    ) -> Self {
        let writer = DocumentWriter::new(output_base);
        let snapshot = Arc::new(SnapshotStore::new(writer.target()));
        Self {
            materializer: TreeMaterializer::new(client.clone(), root_path.clone()),
            client,
            root_path,
            writer,
            snapshot,
            rebuild_gate: Mutex::new(()),
        }
    }

    pub(crate) fn client(&self) -> &Arc<dyn StoreClient> {
        &self.client
    }

    /// Root of the mirrored subtree.
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Handle for typed lookups against the latest snapshot.
    pub fn snapshot(&self) -> Arc<SnapshotStore> {
        self.snapshot.clone()
    }

    /// One full pass: materialize, publish, reload the snapshot.
    ///
    /// Passes are serialized through the rebuild gate, so concurrent change
    /// events queue their rebuilds instead of interleaving file writes; the
    /// last pass to run wins. Returns the number of bytes published.
    pub async fn rebuild(&self) -> Result<u64> {
        let _gate = self.rebuild_gate.lock().await;
        let document = self.materializer.materialize().await?;
        let bytes = self.writer.publish(&document).await?;
        self.snapshot.reload()?;
        Ok(bytes)
    }
}

/// The assembled mirror. Created through [`ZkMirror::builder`].
pub struct ZkMirror {
    ctx: Arc<SyncContext>,
    registry: WatchRegistry,
    config: MirrorConfig,
}

impl std::fmt::Debug for ZkMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZkMirror")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ZkMirror {
    /// Create a configured mirror builder.
    pub fn builder(config: MirrorConfig) -> MirrorBuilder {
        MirrorBuilder::new(config)
    }

    /// Build the initial document and start watching.
    ///
    /// Runs one rebuild pass (materialize, publish, snapshot load) and then
    /// registers one reactor per leaf. Every error on this path is fatal:
    /// the host should not proceed without a successfully mirrored document.
    pub async fn start(&self) -> Result<()> {
        let bytes = self.ctx.rebuild().await?;
        info!(
            "initial document for {} published ({} bytes)",
            self.ctx.root_path(),
            bytes
        );

        self.registry.register_all(&self.ctx).await?;
        info!("{} leaf watcher(s) active", self.registry.len());
        Ok(())
    }

    /// Handle for typed lookups against the latest snapshot.
    pub fn snapshot(&self) -> Arc<SnapshotStore> {
        self.ctx.snapshot()
    }

    /// The active leaf watcher registry.
    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Stop all leaf watchers. The published file and the loaded snapshot
    /// stay available.
    pub fn shutdown(&self) {
        self.registry.shutdown();
    }
}
