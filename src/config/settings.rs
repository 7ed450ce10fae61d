use crate::error::{BlockchainError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use uuid::Uuid;

static DEFAULT_NODE_ADDR: &str = "127.0.0.1:5000";

const NODE_ADDRESS_KEY: &str = "NODE_ADDRESS";
const NODE_ID_KEY: &str = "NODE_ID";

/// Node settings. Built from defaults, then an optional TOML file, then the
/// environment (`NODE_ADDRESS`, `NODE_ID`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the node listens on
    pub node_addr: String,
    /// Identifier reported by the node; random unless configured
    pub node_id: String,
    /// Peers registered at start-up
    pub peers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            node_addr: String::from(DEFAULT_NODE_ADDR),
            node_id: generate_node_id(),
            peers: Vec::new(),
        }
    }
}

pub fn generate_node_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl Config {
    /// Defaults overridden by the environment
    pub fn new() -> Config {
        Config::default().with_overrides(|key| env::var(key).ok())
    }

    /// Read a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| {
            BlockchainError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config.with_overrides(|key| env::var(key).ok()))
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Config {
        if let Some(addr) = lookup(NODE_ADDRESS_KEY) {
            self.node_addr = addr;
        }
        if let Some(node_id) = lookup(NODE_ID_KEY) {
            self.node_id = node_id;
        }
        self
    }
}
