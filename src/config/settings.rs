use std::path::PathBuf;

use serde::Deserialize;

use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_LOG_LEVEL};

/// ================================
/// Full broker configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerConfig {
    pub api: ApiConfig,
    pub credentials: CredentialsConfig,
    pub storage: StorageConfig,
    pub logging: Option<LoggingConfig>,
}

impl BrokerConfig {
    /// Builds a config without a file, defaults applied.
    pub fn from_parts(
        host: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        storage: impl Into<PathBuf>,
    ) -> Self {
        Self {
            api: ApiConfig { host: host.into(), timeout_ms: None },
            credentials: CredentialsConfig {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
            },
            storage: StorageConfig { path: storage.into() },
            logging: Some(LoggingConfig::default()),
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.api.timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS)
    }
}

/// ================================
/// Remote API
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// `api.example.com` or a full `https://api.example.com/base` url
    pub host: String,
    pub timeout_ms: Option<u64>,
}

impl ApiConfig {
    /// Base url ending with `/`, `https://` assumed when no scheme is given.
    pub fn base_url(&self) -> String {
        let host = self.host.trim();
        let mut url = if host.contains("://") {
            host.to_owned()
        } else {
            format!("https://{}", host)
        };
        if !url.ends_with('/') {
            url.push('/');
        }
        url
    }
}

#[derive(Clone, Deserialize)]
pub struct CredentialsConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// directory holding one token file per credential pair
    pub path: PathBuf,
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new (level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_LEVEL.to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}
