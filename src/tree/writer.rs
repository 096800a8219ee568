//! Document publishing
//!
//! Serializes a materialized document and replaces the local target file in
//! one step: the payload lands in a scratch file next to the target and is
//! renamed over it, so a failed publish never leaves a truncated target
//! behind.

use std::path::Path;
use std::path::PathBuf;

use tracing::info;
use tracing::warn;

use super::TreeDocument;
use crate::constants::OUTPUT_FILE_SUFFIX;
use crate::constants::TEMP_FILE_SUFFIX;
use crate::Result;
use crate::WriteError;

/// Persists documents to `<base path>.json`, fully replacing prior content.
pub struct DocumentWriter {
    target: PathBuf,
}

impl DocumentWriter {
    /// `base_path` is the configured output base; the `.json` suffix is
    /// appended verbatim.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let mut target = base_path.into().into_os_string();
        target.push(OUTPUT_FILE_SUFFIX);
        Self {
            target: PathBuf::from(target),
        }
    }

    /// Full path of the published file.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Serialize the inner content of `document` and atomically replace the
    /// target file with it.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    /// [`WriteError`] when serialization or any filesystem step fails; the
    /// previous target content stays in place in that case.
    pub async fn publish(
        &self,
        document: &TreeDocument,
    ) -> Result<u64> {
        let mut payload = document.to_pretty_json().map_err(WriteError::Serialize)?;
        payload.push('\n');
        let bytes = payload.into_bytes();

        if let Some(parent) = self.target.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| WriteError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let scratch = self.scratch_path();
        tokio::fs::write(&scratch, &bytes).await.map_err(|e| WriteError::Io {
            path: scratch.clone(),
            source: e,
        })?;

        if let Err(e) = tokio::fs::rename(&scratch, &self.target).await {
            warn!("failed to move scratch file over {:?}: {}", self.target, e);
            let _ = tokio::fs::remove_file(&scratch).await;
            return Err(WriteError::Io {
                path: self.target.clone(),
                source: e,
            }
            .into());
        }

        info!("wrote {} bytes to {}", bytes.len(), self.target.display());
        Ok(bytes.len() as u64)
    }

    fn scratch_path(&self) -> PathBuf {
        let mut scratch = self.target.clone().into_os_string();
        scratch.push(TEMP_FILE_SUFFIX);
        PathBuf::from(scratch)
    }
}
