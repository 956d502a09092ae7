use std::sync::Arc;

use http::Method;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::auth::credentials::Credentials;
use crate::cache::{Token, TokenStore};
use crate::dispatch::request::ApiRequest;
use crate::dispatch::response::{interpret, Reply};
use crate::dispatch::transport::Transport;
use crate::errors::ApiError;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{
    ACCESS_TOKEN_FIELD, GRANT_TYPE_CLIENT_CREDENTIALS, ORIGIN_ENDPOINT, ORIGIN_STORE, TOKEN_ENDPOINT_PATH,
};

/// Owns the current token of one credential pair and its durable copy.
///
/// Concurrent refreshes are not coalesced: two callers hitting a 401 at the
/// same time both call [`TokenManager::acquire`], the last write wins in
/// memory and in the store.
pub struct TokenManager<T, S> {
    credentials: Credentials,
    cache_key: String,
    transport: Arc<T>,
    store: S,
    current: RwLock<Option<Token>>,
}

impl<T: Transport, S: TokenStore> TokenManager<T, S> {
    pub fn new(credentials: Credentials, transport: Arc<T>, store: S) -> Self {
        let cache_key = credentials.cache_key();
        Self {
            credentials,
            cache_key,
            transport,
            store,
            current: RwLock::new(None),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn transport(&self) -> Arc<T> {
        self.transport.clone()
    }

    /// Snapshot of the in-memory token.
    pub async fn current(&self) -> Option<Token> {
        self.current.read().await.clone()
    }

    /// Reuses a persisted token for these credentials, otherwise acquires one.
    pub async fn initialize(&self) -> Result<Token, ApiError> {
        self.store.ensure_container().await.map_err(ApiError::storage)?;

        let stored = self.store.read(&self.cache_key).await.map_err(|err| {
            error!("token store read failed: {}", err);
            ApiError::storage(err)
        })?;

        if let Some(value) = stored {
            let token = Token::new(value);
            debug!("reusing persisted token {} for client '{}'", token.fingerprint(), self.credentials.client_id());
            *self.current.write().await = Some(token.clone());
            get_metrics().await.token_acquisitions.with_label_values(&[ORIGIN_STORE]).inc();
            return Ok(token);
        }

        self.acquire().await
    }

    /// Client-credentials grant against the token endpoint. Failures are
    /// returned as-is, nothing is retried here.
    pub async fn acquire(&self) -> Result<Token, ApiError> {
        let metrics = get_metrics().await;
        info!("requesting access token for client '{}'", self.credentials.client_id());

        let request = ApiRequest::new(
            Method::POST,
            TOKEN_ENDPOINT_PATH,
            json!({
                "grant_type": GRANT_TYPE_CLIENT_CREDENTIALS,
                "client_id": self.credentials.client_id(),
                "client_secret": self.credentials.client_secret(),
            }),
        );

        let result = self.request_token(&request).await;
        let token = match result {
            Ok(token) => token,
            Err(err) => {
                error!("token request failed: {}", err);
                metrics.dispatch_failures.with_label_values(&[err.kind()]).inc();
                return Err(err);
            }
        };

        self.store
            .write(&self.cache_key, token.as_str())
            .await
            .map_err(|err| {
                error!("persisting token failed: {}", err);
                ApiError::storage(err)
            })?;
        metrics.token_store_writes.inc();

        *self.current.write().await = Some(token.clone());
        metrics.token_acquisitions.with_label_values(&[ORIGIN_ENDPOINT]).inc();
        info!("acquired token {} for client '{}'", token.fingerprint(), self.credentials.client_id());
        Ok(token)
    }

    async fn request_token(&self, request: &ApiRequest) -> Result<Token, ApiError> {
        let raw = self.transport.send(request).await?;
        let body = match interpret(&raw)? {
            Reply::InvalidClient => return Err(ApiError::InvalidCredentials),
            Reply::Unauthorized { body } | Reply::Body { body, .. } => body,
        };

        match body.get(ACCESS_TOKEN_FIELD).and_then(Value::as_str) {
            Some(value) if !value.is_empty() => Ok(Token::new(value)),
            _ => Err(ApiError::upstream(body)),
        }
    }
}
