use std::fmt;

use crate::cache::cache_key;
use crate::config::settings::CredentialsConfig;

/// Client-credentials pair, immutable once configured.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn cache_key(&self) -> String {
        cache_key(&self.client_id, &self.client_secret)
    }
}

impl From<&CredentialsConfig> for Credentials {
    fn from(cfg: &CredentialsConfig) -> Self {
        Self::new(cfg.client_id.to_owned(), cfg.client_secret.to_owned())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}
