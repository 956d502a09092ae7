use std::path::Path;

use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::{BrokerConfig, LoggingConfig};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<BrokerConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("read config '{}': {}", path.display(), e))?;

    let expanded = expand_env_vars(&content);
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<BrokerConfig> {
    let mut config: BrokerConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    if config.logging.is_none() {
        config.logging = Some(LoggingConfig::default());
    }
    debug!("validation config ...");
    validate_config(&config).map_err(|errors| anyhow!("invalid config: {}", errors.join("; ")))?;

    Ok(config)
}

/// Returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_config(cfg: &BrokerConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.api.host.trim().is_empty() {
        errors.push("api.host must not be empty".to_string());
    }
    if cfg.api.timeout_ms == Some(0) {
        errors.push("api.timeout_ms must be > 0".to_string());
    }
    if cfg.credentials.client_id.is_empty() {
        errors.push("credentials.client_id must not be empty".to_string());
    }
    if cfg.credentials.client_secret.is_empty() {
        errors.push("credentials.client_secret must not be empty".to_string());
    }
    if cfg.storage.path.as_os_str().is_empty() {
        errors.push("storage.path must not be empty".to_string());
    }
    if let Some(logging) = &cfg.logging {
        let level = logging.level.to_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            errors.push(format!("logging.level '{}' is not one of trace|debug|info|warn|error", logging.level));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

/// Replaces `${VAR}` and `${VAR:default}` with values from the environment.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
