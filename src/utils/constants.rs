//! Shared constants and invariants

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_CONFIG_PATH: &str = "token-broker.yaml";

// Token endpoint
pub const TOKEN_ENDPOINT_PATH: &str = "oauth/access_token";
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";
pub const INVALID_CLIENT_ERROR: &str = "invalid_client";
pub const ACCESS_TOKEN_FIELD: &str = "access_token";

// Metric labels
pub const ORIGIN_STORE: &str = "store";
pub const ORIGIN_ENDPOINT: &str = "endpoint";
