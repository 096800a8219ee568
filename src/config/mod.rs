//! Configuration management module for the mirror.
//!
//! Provides layered loading of the five resolved inputs the core needs
//! (store addresses, auth scheme, auth token, subtree root, output base
//! path) with priority:
//! 1. Default values (hardcoded)
//! 2. Descriptor file or host-application section
//! 3. Environment variables (highest priority, `ZK_MIRROR` prefix)


use std::path::PathBuf;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::Result;

/// Connection parameters consumed by store-client adapters.
#[derive(Debug, Deserialize, Clone)]
pub struct ConnectionConfig {
    /// Store endpoints, `host:port`
    pub addresses: Vec<String>,

    /// Authentication scheme name (e.g. `digest`); empty disables auth
    #[serde(default)]
    pub scheme: String,

    /// Credential blob applied right after connect
    #[serde(default)]
    pub auth: String,

    /// Connect timeout (unit: milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl ConnectionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            addresses: vec!["127.0.0.1:2181".to_string()],
            scheme: String::new(),
            auth: String::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

/// What to mirror and where to publish it.
#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Root of the store subtree to mirror (absolute path)
    pub root_path: String,

    /// Output base path; the published file lands at `<output_path>.json`
    pub output_path: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root_path: "/".to_string(),
            output_path: PathBuf::from("config/zk-mirror"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MirrorConfig {
    /// Store connection parameters
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Subtree selection and output location
    #[serde(default)]
    pub sync: SyncConfig,
}

impl MirrorConfig {
    /// Load from a standalone descriptor file, overlaid with `ZK_MIRROR`
    /// environment variables (`__` separator, e.g.
    /// `ZK_MIRROR__SYNC__ROOT_PATH`).
    ///
    /// # Arguments
    /// * `path` - descriptor file path, extension optional
    pub fn load(path: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("ZK_MIRROR")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<MirrorConfig>()?;

        config.validate()?;
        Ok(config)
    }

    /// Read a nested section of a host application's configuration,
    /// for applications that carry the mirror inputs inside their own
    /// config file instead of a standalone descriptor.
    pub fn from_host_config(
        host: &Config,
        section: &str,
    ) -> Result<Self> {
        let config: MirrorConfig = host.get(section)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the mirror cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.connection.addresses.is_empty() {
            return Err(ConfigError::Message(
                "at least one store address is required".to_string(),
            )
            .into());
        }
        if !self.sync.root_path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "root path {:?} must be absolute (start with '/')",
                self.sync.root_path
            ))
            .into());
        }
        if self.sync.output_path.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "output path must not be empty".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

fn default_connect_timeout_ms() -> u64 {
    1000
}
