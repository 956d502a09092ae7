//! Error taxonomy shared by the token manager and the request dispatcher.
//!
//! Every failure collapses into the uniform `{ "is_error": 1, "message": ... }`
//! shape through [`ApiError::to_value`], so callers can branch on `is_error`
//! instead of matching error types.

use serde_json::{json, Map, Value};
use thiserror::Error;

pub const INVALID_CREDENTIALS_MSG: &str = "Invalid credentials";
pub const INVALID_RESPONSE_MSG: &str = "Bad response from server";
pub const INVALID_TOKEN_MSG: &str = "Invalid token";

pub type ApiResult = Result<Value, ApiError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Token endpoint answered 401 with `error == "invalid_client"`.
    #[error("{}", INVALID_CREDENTIALS_MSG)]
    InvalidCredentials,

    /// Body was not valid JSON.
    #[error("{}", INVALID_RESPONSE_MSG)]
    InvalidResponse,

    /// Connection level failure, `code` mirrors the errno-like name.
    #[error("transport error: {code}")]
    Transport { code: String },

    /// The single retry after a token refresh was rejected with 401 as well.
    #[error("{}", INVALID_TOKEN_MSG)]
    InvalidToken,

    /// Structured error payload returned by the API itself.
    #[error("upstream error: {}", .message.as_deref().unwrap_or("<no message>"))]
    Upstream { message: Option<String>, body: Value },

    #[error("token storage error: {message}")]
    Storage { message: String },
}

impl ApiError {
    pub fn transport(code: impl Into<String>) -> Self {
        ApiError::Transport { code: code.into() }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        ApiError::Storage { message: err.to_string() }
    }

    /// Builds an upstream error, picking a human readable message from the body.
    pub fn upstream(body: Value) -> Self {
        let message = ["message", "error_description", "error"]
            .iter()
            .find_map(|field| body.get(*field).and_then(Value::as_str).filter(|m| !m.is_empty()))
            .map(str::to_owned);
        ApiError::Upstream { message, body }
    }

    /// Short stable label, used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::InvalidResponse => "invalid_response",
            ApiError::Transport { .. } => "transport",
            ApiError::InvalidToken => "invalid_token",
            ApiError::Upstream { .. } => "upstream",
            ApiError::Storage { .. } => "storage",
        }
    }

    /// Message placed into the uniform error object, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            ApiError::InvalidCredentials => Some(INVALID_CREDENTIALS_MSG.to_owned()),
            ApiError::InvalidResponse => Some(INVALID_RESPONSE_MSG.to_owned()),
            ApiError::Transport { code } => Some(code.to_owned()),
            ApiError::InvalidToken => Some(INVALID_TOKEN_MSG.to_owned()),
            ApiError::Upstream { message, .. } => message.to_owned(),
            ApiError::Storage { message } => Some(message.to_owned()),
        }
    }

    pub fn to_value(&self) -> Value {
        error_value(self.message())
    }
}

/// `{ "is_error": 1 }` plus `message` when it is present and non-empty.
pub fn error_value(message: Option<String>) -> Value {
    let mut data = Map::new();
    data.insert("is_error".to_owned(), json!(1));
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        data.insert("message".to_owned(), Value::String(message));
    }
    Value::Object(data)
}

/// Collapses both arms of a result into the single value callers branch on.
pub fn into_uniform(result: ApiResult) -> Value {
    result.unwrap_or_else(|err| err.to_value())
}

/// True when `value` carries a truthy `is_error` member.
pub fn is_error(value: &Value) -> bool {
    match value.get("is_error") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}
