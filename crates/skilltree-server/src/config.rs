//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use skilltree_core::{EngineConfig, LayoutConfig};

use crate::error::{Error, Result};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_STATE: &str = "./skilltree.json";

/// Skill tree server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub addr: SocketAddr,
    /// JSON file the editor state is loaded from and saved to
    pub state_path: PathBuf,
    /// Seed for deterministic node ids
    pub seed: Option<u64>,
    pub layout: LayoutConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            state_path: PathBuf::from(DEFAULT_STATE),
            seed: None,
            layout: LayoutConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables with sensible defaults.
    ///
    /// - `SKILLTREE_ADDR`: listen address (default `127.0.0.1:3000`)
    /// - `SKILLTREE_STATE`: state file (default `./skilltree.json`)
    /// - `SKILLTREE_SEED`: optional id seed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup("SKILLTREE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr.parse().map_err(|_| Error::InvalidConfig {
            var: "SKILLTREE_ADDR",
            value: raw_addr.clone(),
        })?;

        let state_path = lookup("SKILLTREE_STATE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE));

        let seed = match lookup("SKILLTREE_SEED") {
            Some(raw) => Some(raw.trim().parse().map_err(|_| Error::InvalidConfig {
                var: "SKILLTREE_SEED",
                value: raw.clone(),
            })?),
            None => None,
        };

        Ok(Self {
            addr,
            state_path,
            seed,
            layout: LayoutConfig::default(),
        })
    }

    /// Engine settings derived from this config.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            seed: self.seed,
            layout: self.layout.clone(),
        }
    }
}
