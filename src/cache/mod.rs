//! Token value, cache key derivation and durable token storage.

pub mod cache_key;
pub mod token;
pub mod token_store;

pub use cache_key::cache_key;
pub use token::Token;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
