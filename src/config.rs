//! Configuration Management
//!
//! Handles persistent configuration storage for vppstate and loading desired
//! state documents from disk.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::facts::DEFAULT_NAMESPACE;
use crate::reconcile::DEFAULT_SOCKET_DIR;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENDPOINT_ENV: &str = "VPP_API_ENDPOINT";
pub const TOKEN_ENV: &str = "VPP_API_TOKEN";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the dataplane API gateway
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bearer token for the gateway
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub socket_dir: Option<PathBuf>,
    /// Fact name prefix
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vppstate").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file; missing or unreadable files yield defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get effective endpoint (config > environment > default)
    pub fn effective_endpoint(&self) -> String {
        self.endpoint_with(env_var)
    }

    /// Get effective token (config > environment)
    pub fn effective_token(&self) -> Option<String> {
        self.token_with(env_var)
    }

    fn endpoint_with(&self, env: impl Fn(&str) -> Option<String>) -> String {
        self.endpoint
            .clone()
            .or_else(|| env(ENDPOINT_ENV))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    fn token_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.token.clone().or_else(|| env(TOKEN_ENV))
    }

    pub fn effective_socket_dir(&self) -> PathBuf {
        self.socket_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET_DIR))
    }

    pub fn effective_namespace(&self) -> String {
        self.namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Load a desired state document. `.json` files are read as JSON, anything else as YAML.
pub fn load_params<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading parameters from {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}
