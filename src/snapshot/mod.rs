//! Snapshot store and typed lookup API
//!
//! Process-wide handle onto the most recently published document. The store
//! re-reads the writer's output file after every rebuild and swaps the parsed
//! snapshot in atomically; lookups always serve from the last successfully
//! loaded snapshot and never touch the store or the filesystem.


use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use config::Config;
use config::File;
use config::FileFormat;
use tracing::debug;

use crate::utils::convert::parse_duration;
use crate::utils::convert::parse_size_in_bytes;
use crate::Error;
use crate::Result;

/// Holds the latest loaded document and resolves typed lookups against it.
///
/// Uninitialized until the first successful [`reload`](Self::reload);
/// replaced wholesale, never partially updated, on every rebuild. Cheap to
/// share behind an [`Arc`]; readers are lock-free.
pub struct SnapshotStore {
    source: PathBuf,
    slot: ArcSwapOption<Config>,
}

impl SnapshotStore {
    /// `source` is the full path of the published document file.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            slot: ArcSwapOption::const_empty(),
        }
    }

    /// Path the snapshot is loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Whether at least one document has been loaded successfully.
    pub fn is_initialized(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Re-read the published file and swap the parsed snapshot in.
    ///
    /// On failure the previous snapshot, if any, stays in place.
    pub fn reload(&self) -> Result<()> {
        let path = self.source.to_string_lossy();
        let snapshot = Config::builder()
            .add_source(File::new(path.as_ref(), FileFormat::Json))
            .build()?;
        self.slot.store(Some(Arc::new(snapshot)));
        debug!("snapshot reloaded from {}", path);
        Ok(())
    }

    /// String value for a dotted key (`"group.x"`).
    pub fn get_string(
        &self,
        key: &str,
    ) -> Result<String> {
        Ok(self.current()?.get_string(key)?)
    }

    pub fn get_bool(
        &self,
        key: &str,
    ) -> Result<bool> {
        Ok(self.current()?.get_bool(key)?)
    }

    /// Integer value; covers both 32- and 64-bit consumers.
    pub fn get_int(
        &self,
        key: &str,
    ) -> Result<i64> {
        Ok(self.current()?.get_int(key)?)
    }

    pub fn get_float(
        &self,
        key: &str,
    ) -> Result<f64> {
        Ok(self.current()?.get_float(key)?)
    }

    pub fn get_string_slice(
        &self,
        key: &str,
    ) -> Result<Vec<String>> {
        self.current()?
            .get_array(key)?
            .into_iter()
            .map(|value| value.into_string().map_err(Error::from))
            .collect()
    }

    /// Mapping below `key` with raw (still-typed) values.
    pub fn get_string_map(
        &self,
        key: &str,
    ) -> Result<config::Map<String, config::Value>> {
        Ok(self.current()?.get_table(key)?)
    }

    /// Mapping below `key` with every value coerced to a string.
    pub fn get_string_map_string(
        &self,
        key: &str,
    ) -> Result<config::Map<String, String>> {
        self.current()?
            .get_table(key)?
            .into_iter()
            .map(|(name, value)| {
                let value = value.into_string().map_err(Error::from)?;
                Ok((name, value))
            })
            .collect()
    }

    /// Duration value; see [`parse_duration`] for the accepted grammar.
    pub fn get_duration(
        &self,
        key: &str,
    ) -> Result<Duration> {
        parse_duration(&self.get_string(key)?)
    }

    /// Byte-size value; see [`parse_size_in_bytes`] for the accepted grammar.
    pub fn get_size_in_bytes(
        &self,
        key: &str,
    ) -> Result<u64> {
        parse_size_in_bytes(&self.get_string(key)?)
    }

    fn current(&self) -> Result<Arc<Config>> {
        self.slot.load_full().ok_or(Error::NotInitialized)
    }
}
