use std::error::Error as StdError;
use std::future::Future;
use std::io::ErrorKind;
use std::time::Duration;

use anyhow::Result;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use crate::dispatch::request::{ApiRequest, RawResponse};
use crate::errors::ApiError;

const APPLICATION_JSON: &str = "application/json";

pub trait Transport: Send + Sync {
    /// Delivers `request` and returns the undecoded response.
    /// Only connection level failures are errors, as `ApiError::Transport`.
    fn send(&self, request: &ApiRequest) -> impl Future<Output = Result<RawResponse, ApiError>> + Send;
}

/// JSON over HTTP(S) with reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { client, base_url }
    }

    pub fn url_for(&self, request: &ApiRequest) -> String {
        format!("{}{}", self.base_url, request.relative_path())
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        let url = self.url_for(request);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON);

        if let Some(token) = &request.bearer {
            builder = builder.header(AUTHORIZATION, token.bearer_header());
        }
        if request.has_body() {
            builder = builder.json(&request.payload);
        }

        debug!("{} {}", request.method, url);
        let response = builder.send().await.map_err(|err| transport_error(&err))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| transport_error(&err))?;
        Ok(RawResponse { status, body })
    }
}

fn transport_error(err: &reqwest::Error) -> ApiError {
    let code = transport_code(err);
    debug!("transport failure {}: {}", code, err);
    ApiError::transport(code)
}

/// Maps a reqwest failure onto an errno-like code.
pub fn transport_code(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        return "ETIMEDOUT";
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            match io.kind() {
                ErrorKind::ConnectionRefused => return "ECONNREFUSED",
                ErrorKind::ConnectionReset => return "ECONNRESET",
                ErrorKind::ConnectionAborted => return "ECONNABORTED",
                ErrorKind::TimedOut => return "ETIMEDOUT",
                _ => {}
            }
        }
        if cause.to_string().contains("dns error") {
            return "ENOTFOUND";
        }
        source = cause.source();
    }

    if err.is_connect() {
        "ECONNREFUSED"
    } else {
        "EREQUEST"
    }
}
