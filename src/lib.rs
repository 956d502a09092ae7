//! # Token Broker Library
//!
//! Obtains and caches an OAuth2 client-credentials bearer token, attaches it
//! to every API call, refreshes it once when the API rejects it, and funnels
//! every outcome into a uniform success/error shape. Also provides the
//! legacy tagged serializer used for some payload fields.
//!
//! Modules:
//! - `config` — broker configuration (YAML, env expansion, validation)
//! - `cache` — token value, cache key, durable token stores
//! - `auth` — credentials and the token manager
//! - `dispatch` — transport seam and the request dispatcher
//! - `errors` — error taxonomy and the uniform result shape
//! - `legacy` — tagged value type and serializer

pub mod auth;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod legacy;
pub mod observability;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::auth::{Credentials, TokenManager};
pub use crate::cache::{FileTokenStore, MemoryTokenStore, Token, TokenStore};
pub use crate::config::BrokerConfig;
pub use crate::dispatch::{HttpDispatcher, HttpTransport, RequestDispatcher, Transport};
pub use crate::errors::{into_uniform, is_error, ApiError, ApiResult};
pub use crate::legacy::{serialize, serialize_json, LegacyValue};
