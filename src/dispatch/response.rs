use serde_json::Value;
use tracing::debug;

use crate::dispatch::request::RawResponse;
use crate::errors::ApiError;
use crate::utils::constants::INVALID_CLIENT_ERROR;

pub const STATUS_UNAUTHORIZED: u16 = 401;

/// What the dispatcher needs to know about a decoded response.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 401 with `error == "invalid_client"`: the credentials themselves are wrong.
    InvalidClient,
    /// Any other 401: the token was rejected.
    Unauthorized { body: Value },
    /// Every other status, body passed through untouched.
    Body { status: u16, body: Value },
}

/// Decodes the body first; an undecodable body fails regardless of status.
pub fn interpret(raw: &RawResponse) -> Result<Reply, ApiError> {
    let body: Value = serde_json::from_str(&raw.body).map_err(|err| {
        debug!("response with status {} is not json: {}", raw.status, err);
        ApiError::InvalidResponse
    })?;

    if raw.status != STATUS_UNAUTHORIZED {
        return Ok(Reply::Body { status: raw.status, body });
    }
    if is_invalid_client(&body) {
        return Ok(Reply::InvalidClient);
    }
    Ok(Reply::Unauthorized { body })
}

pub fn is_invalid_client(body: &Value) -> bool {
    body.get("error").and_then(Value::as_str) == Some(INVALID_CLIENT_ERROR)
}

/// Error indicator a caller may look for in a non-401 body.
pub fn carries_error(body: &Value) -> bool {
    crate::errors::is_error(body) || body.get("error").is_some_and(|e| !e.is_null())
}
