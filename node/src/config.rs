// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::FlockError;

/// Settings for the `flock-node` binary.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    pub provider_id: u16,
    /// Path to a provider config document (JSON). `None` uses
    /// [`ProviderConfig::default`].
    pub config_path: Option<PathBuf>,
    /// Bootstrap file, overriding the `file` entry of the provider config.
    pub file: Option<PathBuf>,
    pub client: RpcClientConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4000)),
            provider_id: 42,
            config_path: None,
            file: None,
            client: RpcClientConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Read `FLOCK_BIND_ADDR`, `FLOCK_PROVIDER_ID`, `FLOCK_CONFIG` and
    /// `FLOCK_FILE` on top of the defaults.
    pub fn from_env() -> Result<Self, FlockError> {
        let mut cfg = Self::default();

        if let Ok(addr) = std::env::var("FLOCK_BIND_ADDR") {
            cfg.bind_addr = addr
                .parse()
                .map_err(|e| FlockError::InvalidConfig(format!("FLOCK_BIND_ADDR {addr:?}: {e}")))?;
        }
        if let Ok(id) = std::env::var("FLOCK_PROVIDER_ID") {
            cfg.provider_id = id
                .parse()
                .map_err(|e| FlockError::InvalidConfig(format!("FLOCK_PROVIDER_ID {id:?}: {e}")))?;
        }
        if let Ok(path) = std::env::var("FLOCK_CONFIG") {
            cfg.config_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("FLOCK_FILE") {
            cfg.file = Some(PathBuf::from(path));
        }

        Ok(cfg)
    }
}

/// Client-side transport settings.
#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    /// Deadline for a whole request, connect included.
    pub request_timeout: Duration,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// How a provider builds its initial view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum BootstrapMethod {
    /// Use the view passed in the provider arguments. Without one, resume
    /// from the bootstrap file if it exists, else start empty.
    #[default]
    #[serde(rename = "view")]
    FromView,
    /// Single-member view holding the provider itself.
    #[serde(rename = "self")]
    FromSelf,
    /// Load the view from the bootstrap file, which must exist.
    #[serde(rename = "file")]
    FromFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Static,
    Centralized(CentralizedConfig),
}

impl BackendConfig {
    pub fn type_name(&self) -> &'static str {
        match self {
            BackendConfig::Static => "static",
            BackendConfig::Centralized(_) => "centralized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CentralizedConfig {
    /// Serialize mutations against each other.
    #[serde(default)]
    pub use_lock: bool,
    /// Enables member liveness pings when set.
    #[serde(default)]
    pub ping_interval_ms: Option<u64>,
    #[serde(default = "default_ping_timeout_ms")]
    pub ping_timeout_ms: u64,
    #[serde(default = "default_ping_max_num_timeouts")]
    pub ping_max_num_timeouts: u32,
}

fn default_ping_timeout_ms() -> u64 {
    1000
}

fn default_ping_max_num_timeouts() -> u32 {
    3
}

impl Default for CentralizedConfig {
    fn default() -> Self {
        Self {
            use_lock: false,
            ping_interval_ms: None,
            ping_timeout_ms: default_ping_timeout_ms(),
            ping_max_num_timeouts: default_ping_max_num_timeouts(),
        }
    }
}

/// Resolved liveness monitor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingSettings {
    pub interval: Duration,
    pub timeout: Duration,
    pub max_num_timeouts: u32,
}

impl CentralizedConfig {
    pub fn ping_settings(&self) -> Option<PingSettings> {
        self.ping_interval_ms.map(|interval| PingSettings {
            interval: Duration::from_millis(interval),
            timeout: Duration::from_millis(self.ping_timeout_ms),
            max_num_timeouts: self.ping_max_num_timeouts,
        })
    }

    fn validate(&self) -> Result<(), FlockError> {
        if self.ping_interval_ms == Some(0) {
            return Err(FlockError::InvalidConfig("ping_interval_ms must be positive".into()));
        }
        if self.ping_timeout_ms == 0 {
            return Err(FlockError::InvalidConfig("ping_timeout_ms must be positive".into()));
        }
        if self.ping_max_num_timeouts == 0 {
            return Err(FlockError::InvalidConfig(
                "ping_max_num_timeouts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Provider configuration document:
///
/// ```json
/// { "group": { "type": "centralized", "config": { "use_lock": true } },
///   "file": "/tmp/group.json",
///   "bootstrap": "self" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub group: BackendConfig,
    pub file: Option<PathBuf>,
    pub bootstrap: BootstrapMethod,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            group: BackendConfig::Centralized(CentralizedConfig::default()),
            file: None,
            bootstrap: BootstrapMethod::FromSelf,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProviderConfig {
    group: RawGroupConfig,
    #[serde(default)]
    file: Option<PathBuf>,
    #[serde(default)]
    bootstrap: BootstrapMethod,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGroupConfig {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    config: Option<Value>,
}

impl ProviderConfig {
    pub fn from_json(text: &str) -> Result<Self, FlockError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| FlockError::InvalidConfig(format!("not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, FlockError> {
        let raw: RawProviderConfig =
            serde_json::from_value(value).map_err(|e| FlockError::InvalidConfig(e.to_string()))?;

        let group = match raw.group.kind.as_str() {
            "static" => {
                match raw.group.config {
                    None | Some(Value::Null) => {}
                    Some(Value::Object(map)) if map.is_empty() => {}
                    Some(other) => {
                        return Err(FlockError::InvalidConfig(format!(
                            "static backend takes no options, got {other}"
                        )))
                    }
                }
                BackendConfig::Static
            }
            "centralized" => {
                let config = match raw.group.config {
                    None | Some(Value::Null) => CentralizedConfig::default(),
                    Some(value) => serde_json::from_value::<CentralizedConfig>(value).map_err(
                        |e| FlockError::InvalidConfig(format!("centralized backend: {e}")),
                    )?,
                };
                config.validate()?;
                BackendConfig::Centralized(config)
            }
            other => {
                return Err(FlockError::InvalidConfig(format!(
                    "unknown backend type {other:?}"
                )))
            }
        };

        Ok(Self {
            group,
            file: raw.file,
            bootstrap: raw.bootstrap,
        })
    }
}
