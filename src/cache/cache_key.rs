use sha2::{Digest, Sha256};

pub const CREDENTIALS_SEPARATOR: &str = "::";

/// Storage key for a credential pair: hex SHA-256 of `client_id::client_secret`.
/// Only a naming scheme, the raw secret never reaches the store.
pub fn cache_key(client_id: &str, client_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(client_id.as_bytes());
    hasher.update(CREDENTIALS_SEPARATOR.as_bytes());
    hasher.update(client_secret.as_bytes());
    hex::encode(hasher.finalize())
}
