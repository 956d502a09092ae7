use http::Method;
use serde_json::{Map, Value};

use crate::cache::Token;
use crate::utils::constants::TOKEN_ENDPOINT_PATH;

/// One logical request, before any transport specifics.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// relative to the API base url, a leading `/` is ignored
    pub path: String,
    pub payload: Value,
    pub bearer: Option<Token>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, payload: Value) -> Self {
        Self {
            method,
            path: path.into(),
            payload,
            bearer: None,
        }
    }

    pub fn with_bearer(mut self, bearer: Option<Token>) -> Self {
        self.bearer = bearer;
        self
    }

    pub fn relative_path(&self) -> &str {
        self.path.trim_start_matches('/')
    }

    /// GET requests only carry a body when there is something to send.
    pub fn has_body(&self) -> bool {
        if self.method != Method::GET {
            return true;
        }
        !is_empty_payload(&self.payload)
    }
}

pub fn is_token_endpoint(path: &str) -> bool {
    path.trim_start_matches('/') == TOKEN_ENDPOINT_PATH
}

pub fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// `{}`, the default payload of a call.
pub fn empty_payload() -> Value {
    Value::Object(Map::new())
}

/// Status and undecoded body as delivered by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}
