//! Engine configuration, TOML on disk.

use std::fs::{read_to_string, write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SiloError;

/// Environment variable overriding the configured offline default. "1",
/// "true" or "yes" force offline, "0", "false" or "no" force online.
pub const OFFLINE_ENV_VAR: &str = "SILO_OFFLINE";

const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 10_000;

/// Settings the embedding application hands the engine at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiloConfig {
    /// Start in offline mode: no remote calls until toggled at runtime.
    #[serde(default)]
    pub offline_mode: bool,
    /// Remote endpoint settings. Absent means the engine runs local-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

/// Connection settings for the REST backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the REST endpoint, e.g. `https://xyzcompany.supabase.co`.
    pub base_url: String,
    /// Project API key, sent as the `apikey` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Bearer token of the signed-in user. Falls back to the API key when
    /// absent, which scopes writes to whatever the key's policies allow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_REMOTE_TIMEOUT_MS
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            base_url: String::new(),
            api_key: None,
            access_token: None,
            timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS,
        }
    }
}

impl SiloConfig {
    /// Load from `path`, then apply environment overrides. A missing file
    /// yields the defaults, not an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SiloError> {
        let path = path.as_ref();
        tracing::debug!("Attempting to read engine config from: {:?}", path);
        let mut config = if path.exists() {
            let content = read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            tracing::debug!("Config file not found, using defaults.");
            SiloConfig::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SiloError> {
        tracing::debug!("Attempting to write engine config to: {:?}", path.as_ref());
        let toml_string = toml::to_string(self)?;
        write(path, toml_string)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        let raw = std::env::var(OFFLINE_ENV_VAR).ok();
        self.apply_offline_override(raw.as_deref());
    }

    fn apply_offline_override(&mut self, raw: Option<&str>) {
        let Some(raw) = raw else {
            return;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => self.offline_mode = true,
            "0" | "false" | "no" => self.offline_mode = false,
            other => {
                tracing::warn!(value = other, "unrecognized SILO_OFFLINE value, ignoring")
            }
        }
    }
}
