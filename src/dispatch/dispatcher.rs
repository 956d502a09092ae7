use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use http::Method;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::auth::{Credentials, TokenManager};
use crate::cache::{FileTokenStore, Token, TokenStore};
use crate::config::settings::BrokerConfig;
use crate::dispatch::request::{empty_payload, is_token_endpoint, ApiRequest};
use crate::dispatch::response::{carries_error, interpret, Reply};
use crate::dispatch::transport::{HttpTransport, Transport};
use crate::errors::{ApiError, ApiResult};
use crate::observability::metrics::get_metrics;

static OK_MSG: &'static str = "ok";
static ERROR_MSG: &'static str = "error";

/// Where a call stands in the refresh protocol. A rejected first attempt
/// refreshes the token and moves to `RetriedOnce`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Authorized,
    RetriedOnce,
}

/// Executes API calls with the token of a shared [`TokenManager`].
pub struct RequestDispatcher<T, S> {
    transport: Arc<T>,
    tokens: Arc<TokenManager<T, S>>,
}

impl<T, S> Clone for RequestDispatcher<T, S> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

pub type HttpDispatcher = RequestDispatcher<HttpTransport, FileTokenStore>;

impl HttpDispatcher {
    /// reqwest transport and file store wired from configuration.
    /// The token is not loaded yet, see [`TokenManager::initialize`].
    pub fn from_config(cfg: &BrokerConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(
            cfg.api.base_url(),
            Duration::from_millis(cfg.timeout_ms()),
        )?);
        let store = FileTokenStore::new(cfg.storage.path.clone());
        let tokens = TokenManager::new(Credentials::from(&cfg.credentials), transport, store);
        Ok(Self::new(Arc::new(tokens)))
    }
}

impl<T: Transport, S: TokenStore> RequestDispatcher<T, S> {
    pub fn new(tokens: Arc<TokenManager<T, S>>) -> Self {
        Self {
            transport: tokens.transport(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenManager<T, S>> {
        &self.tokens
    }

    pub async fn get(&self, path: &str, payload: Value) -> ApiResult {
        self.call(path, Method::GET, payload).await
    }

    pub async fn post(&self, path: &str, payload: Value) -> ApiResult {
        self.call(path, Method::POST, payload).await
    }

    pub async fn put(&self, path: &str, payload: Value) -> ApiResult {
        self.call(path, Method::PUT, payload).await
    }

    pub async fn delete(&self, path: &str, payload: Value) -> ApiResult {
        self.call(path, Method::DELETE, payload).await
    }

    /// `POST` with an empty object, the defaults of a bare call.
    pub async fn call_default(&self, path: &str) -> ApiResult {
        self.call(path, Method::POST, empty_payload()).await
    }

    /// One logical API call. A 401 that is not `invalid_client` refreshes the
    /// token and re-issues the request exactly once; other statuses return the
    /// decoded body untouched.
    pub async fn call(&self, path: &str, method: Method, payload: Value) -> ApiResult {
        let metrics = get_metrics().await;
        let start = Instant::now();
        let method_label = method.to_string();

        let result = self.dispatch(ApiRequest::new(method, path, payload)).await;

        metrics
            .api_request_duration
            .with_label_values(&[method_label.as_str()])
            .observe(start.elapsed().as_secs_f64());
        match &result {
            Ok(_) => {
                metrics.api_requests.with_label_values(&[method_label.as_str(), OK_MSG]).inc();
            }
            Err(err) => {
                error!("{} '{}' failed: {}", method_label, path, err);
                metrics.api_requests.with_label_values(&[method_label.as_str(), ERROR_MSG]).inc();
                metrics.dispatch_failures.with_label_values(&[err.kind()]).inc();
            }
        }
        result
    }

    /// Same as [`call`](Self::call), but a body carrying an error indicator
    /// becomes `ApiError::Upstream`.
    pub async fn call_checked(&self, path: &str, method: Method, payload: Value) -> ApiResult {
        let body = self.call(path, method, payload).await?;
        if carries_error(&body) {
            return Err(ApiError::upstream(body));
        }
        Ok(body)
    }

    async fn dispatch(&self, request: ApiRequest) -> ApiResult {
        let token_endpoint = is_token_endpoint(&request.path);
        let mut bearer: Option<Token> = if token_endpoint {
            None
        } else {
            self.tokens.current().await
        };
        let mut attempt = Attempt::Authorized;

        loop {
            let raw = self
                .transport
                .send(&request.clone().with_bearer(bearer.take()))
                .await?;

            match interpret(&raw)? {
                Reply::Body { status, body } => {
                    debug!("'{}' answered {} ({:?})", request.path, status, attempt);
                    return Ok(body);
                }
                Reply::InvalidClient => return Err(ApiError::InvalidCredentials),
                Reply::Unauthorized { body } if token_endpoint => return Err(ApiError::upstream(body)),
                Reply::Unauthorized { .. } if attempt == Attempt::RetriedOnce => {
                    warn!("'{}' rejected again after token refresh, giving up", request.path);
                    return Err(ApiError::InvalidToken);
                }
                Reply::Unauthorized { .. } => {
                    warn!("'{}' answered 401, refreshing token", request.path);
                    get_metrics().await.token_refreshes.inc();
                    let token = self.tokens.acquire().await?;
                    info!("retrying '{}' with token {}", request.path, token.fingerprint());
                    bearer = Some(token);
                    attempt = Attempt::RetriedOnce;
                }
            }
        }
    }
}
