use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://scavenger.prod.gd.midnighttge.io";
pub const DEFAULT_DEVELOPER_ADDRESS: &str = "addr1q9jzapsmek489epz7zyueeye3hpsn50jge8duj0790l3cwzt0equyu45zegnz2ckv599gv6ry54sj45v2anexmv9hfxqjav4dk";
pub const DEFAULT_LOG_FILE: &str = "consolidate.log";
pub const DEFAULT_ACCOUNT_COUNT: u32 = 10;

/// Environment variable consulted when the settings file carries no mnemonic.
pub const MNEMONIC_ENV: &str = "CONSOLIDATE_MNEMONIC";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed TOML settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("no mnemonic in settings and CONSOLIDATE_MNEMONIC is not set")]
    MissingMnemonic,

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Contents of the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Prefer the CONSOLIDATE_MNEMONIC environment variable over storing the phrase on disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
    /// Number of accounts to derive
    #[serde(default = "default_account_count")]
    pub gen_end_index: u32,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub donation: DonationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base")]
    pub base_url: String,
    #[serde(default = "default_statistics_timeout")]
    pub statistics_timeout_secs: u64,
    #[serde(default = "default_donate_timeout")]
    pub donate_timeout_secs: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationConfig {
    #[serde(default = "default_developer_address")]
    pub developer_address: String,
}

fn default_account_count() -> u32 {
    DEFAULT_ACCOUNT_COUNT
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_statistics_timeout() -> u64 {
    8
}

fn default_donate_timeout() -> u64 {
    15
}

fn default_batch_size() -> usize {
    10
}

fn default_developer_address() -> String {
    DEFAULT_DEVELOPER_ADDRESS.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            statistics_timeout_secs: default_statistics_timeout(),
            donate_timeout_secs: default_donate_timeout(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self {
            developer_address: default_developer_address(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mnemonic: None,
            gen_end_index: DEFAULT_ACCOUNT_COUNT,
            log_file: default_log_file(),
            api: ApiConfig::default(),
            donation: DonationConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk. Files ending in `.toml` are parsed as TOML,
    /// everything else as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let settings: Settings = if is_toml(path) {
            toml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_toml(path) {
            toml::to_string_pretty(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gen_end_index == 0 {
            return Err(ConfigError::Invalid(
                "gen_end_index must be a positive account count".to_string(),
            ));
        }
        if self.api.batch_size == 0 {
            return Err(ConfigError::Invalid("api.batch_size must be at least 1".to_string()));
        }
        if self.api.statistics_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "api.statistics_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.api.donate_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "api.donate_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".to_string()));
        }
        Ok(())
    }

    /// The seed phrase, from the file or the environment.
    pub fn resolve_mnemonic(&self) -> Result<String, ConfigError> {
        if let Some(mnemonic) = self.mnemonic.as_deref() {
            if !mnemonic.trim().is_empty() {
                return Ok(mnemonic.trim().to_string());
            }
        }
        match std::env::var(MNEMONIC_ENV) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(ConfigError::MissingMnemonic),
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false)
}

/// Runtime knobs handed to the fetcher, submitter and reporter.
#[derive(Debug, Clone)]
pub struct ConsolidateConfig {
    pub api_base: String,
    pub developer_address: String,
    pub batch_size: usize,
    pub statistics_timeout: Duration,
    pub donate_timeout: Duration,
    pub log_file: PathBuf,
}

impl Default for ConsolidateConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for ConsolidateConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            api_base: settings.api.base_url.trim_end_matches('/').to_string(),
            developer_address: settings.donation.developer_address.clone(),
            batch_size: settings.api.batch_size.max(1),
            statistics_timeout: Duration::from_secs(settings.api.statistics_timeout_secs),
            donate_timeout: Duration::from_secs(settings.api.donate_timeout_secs),
            log_file: settings.log_file.clone(),
        }
    }
}
