// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::fmt;
use std::path::{Path, PathBuf};

use consumption_kernel::config::Config;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Upper bound on the persisted blob written by `FileStorage`.
pub const DEFAULT_MAX_BLOB_BYTES: usize = 256 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub kernel: Config,
    pub state_path: PathBuf,
    pub max_blob_bytes: usize,
    pub transport: TransportConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            kernel: Config::default(),
            state_path: PathBuf::from("consumption_state.bin"),
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
            transport: TransportConfig::None,
        }
    }
}

impl NodeConfig {
    /// Reads a JSON config file. Missing fields take their defaults; the
    /// kernel section must pass admission.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: NodeConfig = serde_json::from_str(raw)?;
        config.kernel.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    /// No delivery path. Syncs fail with `NetworkUnavailable`.
    #[default]
    None,
    Https(HttpSettings),
    Mqtt(MqttSettings),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_ms: u64,
    /// Extra PEM root certificate for private collectors.
    pub ca_cert_path: Option<PathBuf>,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            ca_cert_path: None,
            user_agent: format!("consumption-node/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub topic_base: String,
    pub timeout_ms: u64,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "consumption-node".to_string(),
            username: None,
            password: None,
            topic_base: "devices".to_string(),
            timeout_ms: 5_000,
        }
    }
}

impl fmt::Debug for MqttSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqttSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("topic_base", &self.topic_base)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
