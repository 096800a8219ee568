//! Per-leaf change reactor
//!
//! One reactor task per watched leaf, alive until cancellation. The loop is
//! a two-state machine: armed (waiting on the one-shot subscription) and
//! reacting (one full rebuild-and-publish pass). The store delivers a single
//! event per registration, so the reactor re-subscribes after every fire.

use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::constants::WATCH_REARM_DELAY;
use crate::SyncContext;
use crate::WatchEvent;

pub(crate) struct ChangeReactor {
    path: String,
    ctx: Arc<SyncContext>,
    token: CancellationToken,
}

impl ChangeReactor {
    pub(crate) fn new(
        path: String,
        ctx: Arc<SyncContext>,
        token: CancellationToken,
    ) -> Self {
        Self { path, ctx, token }
    }

    /// Arm, wait, react, re-arm - until cancelled.
    ///
    /// Failures while reacting are logged and swallowed: the reactor never
    /// crashes, and a failed rebuild leaves the previous snapshot in place
    /// until the next successful event.
    pub(crate) async fn run(self) {
        debug!("watching leaf {}", self.path);
        loop {
            let subscription = tokio::select! {
                _ = self.token.cancelled() => break,
                armed = self.ctx.client().get_with_watch(&self.path) => match armed {
                    Ok((_current, subscription)) => subscription,
                    Err(e) => {
                        warn!("failed to arm watch on {}: {}", self.path, e);
                        if self.pause_before_rearm().await {
                            continue;
                        }
                        break;
                    }
                },
            };

            tokio::select! {
                _ = self.token.cancelled() => break,
                event = subscription => match event {
                    Ok(event) => self.react(event).await,
                    Err(_) => {
                        warn!("watch subscription for {} was dropped; re-arming", self.path);
                        if !self.pause_before_rearm().await {
                            break;
                        }
                    }
                },
            }
        }
        debug!("watcher for {} stopped", self.path);
    }

    async fn react(
        &self,
        event: WatchEvent,
    ) {
        info!("node {} changed ({:?}); rebuilding document", event.path, event.kind);
        match self.ctx.rebuild().await {
            Ok(bytes) => {
                debug!("rebuild after change on {} published {} bytes", self.path, bytes);
            }
            Err(e) => {
                warn!(
                    "rebuild after change on {} failed, keeping previous snapshot: {}",
                    self.path, e
                );
            }
        }
    }

    /// Returns false when cancellation arrived during the pause.
    async fn pause_before_rearm(&self) -> bool {
        tokio::select! {
            _ = self.token.cancelled() => false,
            _ = sleep(WATCH_REARM_DELAY) => true,
        }
    }
}
