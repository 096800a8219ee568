//! A builder pattern implementation for constructing a [`ZkMirror`].
//!
//! The builder validates the settings, wires the store client into the
//! shared [`SyncContext`], and assembles the watch registry. The store
//! client itself is external: any connected, authenticated implementation of
//! [`StoreClient`] can back a mirror.

use std::sync::Arc;

use super::SyncContext;
use super::ZkMirror;
use crate::Error;
use crate::MirrorConfig;
use crate::Result;
use crate::StoreClient;
use crate::WatchRegistry;

pub struct MirrorBuilder {
    config: MirrorConfig,
    store: Option<Arc<dyn StoreClient>>,
}

impl MirrorBuilder {
    pub fn new(config: MirrorConfig) -> Self {
        Self {
            config,
            store: None,
        }
    }

    /// Store client backing the mirror.
    pub fn store(
        mut self,
        client: Arc<dyn StoreClient>,
    ) -> Self {
        self.store = Some(client);
        self
    }

    /// Validate the settings and assemble the mirror.
    ///
    /// # Errors
    /// - configuration validation failures
    /// - [`Error::Fatal`] when no store client was provided
    pub fn build(self) -> Result<ZkMirror> {
        self.config.validate()?;
        let client = self
            .store
            .ok_or_else(|| Error::Fatal("a store client is required to build a mirror".to_string()))?;

        let ctx = Arc::new(SyncContext::new(
            client,
            self.config.sync.root_path.clone(),
            self.config.sync.output_path.clone(),
        ));

        Ok(ZkMirror {
            ctx,
            registry: WatchRegistry::new(),
            config: self.config,
        })
    }
}
