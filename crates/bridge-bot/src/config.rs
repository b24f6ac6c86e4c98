//! Bridge configuration: JSON file with defaults, environment overlay,
//! and a reloadable snapshot holder.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::warn;

/// Bridge configuration.
///
/// Persisted as a JSON file (auto-created with defaults when absent);
/// `BRIDGE__*` environment variables override file values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Forum base URL, e.g. "https://forum.example.com". No trailing slash.
    #[serde(default)]
    pub xf_url: String,

    /// XenForo REST API key.
    #[serde(default)]
    pub xf_api_key: String,

    /// How many threads/posts a listing command shows.
    #[serde(default = "default_threads_limit")]
    pub threads_limit: u32,

    /// How many search hits the search command shows.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Outbound HTTP timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Whether commands must be prefixed with "/".
    #[serde(default = "default_require_slash")]
    pub require_slash: bool,

    /// NapCat (OneBot HTTP API) endpoint.
    #[serde(default = "default_napcat_url")]
    pub napcat_url: String,

    /// Shared secret the forum must present on /xenforo/notify.
    #[serde(default)]
    pub webhook_token: String,

    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            xf_url: String::new(),
            xf_api_key: String::new(),
            threads_limit: default_threads_limit(),
            search_limit: default_search_limit(),
            request_timeout: default_request_timeout(),
            require_slash: default_require_slash(),
            napcat_url: default_napcat_url(),
            webhook_token: String::new(),
            listen_addr: default_listen_addr(),
            log_level: default_log_level(),
        }
    }
}

impl BridgeConfig {
    /// Trim trailing slashes off URLs so link formatting can join paths
    /// unconditionally.
    fn normalized(mut self) -> Self {
        while self.xf_url.ends_with('/') {
            self.xf_url.pop();
        }
        while self.napcat_url.ends_with('/') {
            self.napcat_url.pop();
        }
        self
    }
}

fn default_threads_limit() -> u32 {
    5
}

fn default_search_limit() -> u32 {
    5
}

fn default_request_timeout() -> u64 {
    10
}

fn default_require_slash() -> bool {
    true
}

fn default_napcat_url() -> String {
    "http://localhost:3001".into()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8088".into()
}

fn default_log_level() -> String {
    "info".into()
}

/// Reply explaining why the forum API cannot be called yet, naming the
/// missing field and the config file. `None` when the config is ready.
pub fn readiness_error(cfg: &BridgeConfig, path: &Path) -> Option<String> {
    let missing = if cfg.xf_url.is_empty() {
        "xf_url"
    } else if cfg.xf_api_key.is_empty() {
        "xf_api_key"
    } else {
        return None;
    };

    Some(format!(
        "论坛接口未配置：缺少 {}，请编辑配置文件 {}",
        missing,
        path.display()
    ))
}

/// Thread-safe holder for the current configuration snapshot.
///
/// Commands call [`ConfigHandle::reload`] at the start of each invocation,
/// so edits to the config file take effect without a restart. Concurrent
/// invocations during a reload may observe different snapshots; tolerated.
pub struct ConfigHandle {
    path: PathBuf,
    current: RwLock<BridgeConfig>,
}

impl ConfigHandle {
    /// Load the config file, creating it with defaults if absent.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let defaults = BridgeConfig::default();
            let body = serde_json::to_string_pretty(&defaults)
                .context("Failed to serialize default configuration")?;
            std::fs::write(&path, body)
                .with_context(|| format!("Failed to create {}", path.display()))?;
        }

        let cfg = Self::read(&path)?;
        Ok(Self {
            path,
            current: RwLock::new(cfg),
        })
    }

    fn read(path: &Path) -> Result<BridgeConfig> {
        let cfg: BridgeConfig = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()).format(config::FileFormat::Json))
            .add_source(
                config::Environment::with_prefix("BRIDGE")
                    .separator("__")
                    // Group ids and tokens must stay strings even when they
                    // look numeric.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(cfg.normalized())
    }

    /// Path of the backing config file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current snapshot.
    pub async fn current(&self) -> BridgeConfig {
        self.current.read().await.clone()
    }

    /// Re-read the config file and return the fresh snapshot.
    ///
    /// A failed re-read keeps the previous snapshot rather than taking the
    /// bot down mid-command.
    pub async fn reload(&self) -> BridgeConfig {
        match Self::read(&self.path) {
            Ok(cfg) => {
                let mut guard = self.current.write().await;
                *guard = cfg.clone();
                cfg
            }
            Err(e) => {
                warn!("Config reload failed, keeping previous snapshot: {:#}", e);
                self.current.read().await.clone()
            }
        }
    }
}
