//! Configuration Mirror Error Hierarchy
//!
//! Defines the error types for the snapshot-and-watch synchronizer,
//! categorized by lifecycle phase: connecting to the store, walking the
//! subtree, publishing the document, and serving lookups.

use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cannot reach or authenticate to the store. Fatal to startup.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Listing children of a node failed. Fatal to the affected
    /// materialization or registration pass.
    #[error(transparent)]
    Traversal(#[from] TraversalError),

    /// Fetching a leaf value failed. Aborts the current materialization pass.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// Persisting the local document failed. Aborts the current publish.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Value conversion failures in the typed lookup API
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Settings loading and snapshot lookup failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Lookup attempted before any document was successfully loaded
    #[error("snapshot store is not initialized: no document has been loaded yet")]
    NotInitialized,

    /// Unrecoverable failures requiring the host to abort
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// No store endpoint could be reached
    #[error("store unreachable at {address}: {source}")]
    Unreachable {
        address: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Connect attempt exceeded the configured timeout
    #[error("connection to {address} timed out after {duration:?}")]
    Timeout { address: String, duration: Duration },

    /// The store rejected the credential blob for the given scheme
    #[error("authentication with scheme {scheme:?} was rejected")]
    AuthRejected { scheme: String },

    /// An established session expired or was closed by the store
    #[error("session to the store was lost")]
    SessionLost,
}

#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
    /// The most common operator mistake: a mistyped subtree path or a
    /// credential without read permission on it. Kept distinct from generic
    /// I/O failures so the hint reaches the operator.
    #[error("no node under {path:?} - the path or the authentication might be wrong")]
    ChildListing {
        path: String,
        #[source]
        source: Box<Error>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// A node with no children could not deliver its value
    #[error("failed to fetch the value of leaf {path:?}")]
    LeafValue {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// The one-shot change subscription closed without delivering an event
    #[error("watch subscription for {path:?} was dropped before an event fired")]
    WatchLost { path: String },
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Disk I/O failures while persisting the document
    #[error("failed to persist document at {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The materialized document could not be rendered as JSON
    #[error("failed to serialize document")]
    Serialize(#[from] serde_json::Error),
}

/// Error type for value conversion operations
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("invalid duration {value:?}")]
    InvalidDuration { value: String },

    #[error("invalid size {value:?}")]
    InvalidSize { value: String },
}

impl TraversalError {
    /// Wrap a store error raised while listing children of `path`.
    pub(crate) fn child_listing(
        path: impl Into<String>,
        source: Error,
    ) -> Self {
        TraversalError::ChildListing {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl ReadError {
    /// Wrap a store error raised while fetching the value of leaf `path`.
    pub(crate) fn leaf_value(
        path: impl Into<String>,
        source: Error,
    ) -> Self {
        ReadError::LeafValue {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
