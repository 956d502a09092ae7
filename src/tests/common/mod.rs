// tests/common/mod.rs
pub use httpmock::Method::{DELETE, GET, POST, PUT};
pub use httpmock::{Mock, MockServer};
pub use serde_json::json;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Credentials, TokenManager};
use crate::cache::FileTokenStore;
use crate::dispatch::{HttpTransport, RequestDispatcher};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";

pub type TestDispatcher = RequestDispatcher<HttpTransport, FileTokenStore>;

pub fn credentials() -> Credentials {
    Credentials::new(CLIENT_ID, CLIENT_SECRET)
}

/// Dispatcher against `server`, storing tokens under `dir`.
pub fn build_dispatcher(server: &MockServer, dir: &Path) -> TestDispatcher {
    let transport = Arc::new(
        HttpTransport::new(server.base_url(), Duration::from_secs(5)).expect("reqwest client"),
    );
    let tokens = TokenManager::new(credentials(), transport, FileTokenStore::new(dir));
    RequestDispatcher::new(Arc::new(tokens))
}

/// Token endpoint answering every valid grant with `token`.
pub async fn mock_token_endpoint<'a>(server: &'a MockServer, token: &str) -> Mock<'a> {
    let body = json!({"access_token": token, "token_type": "Bearer", "expires_in": 3600});
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/oauth/access_token")
                .json_body(json!({
                    "grant_type": "client_credentials",
                    "client_id": CLIENT_ID,
                    "client_secret": CLIENT_SECRET,
                }));
            then.status(200).json_body(body.clone());
        })
        .await
}

/// Puts `token` where the manager looks for persisted tokens.
pub fn persist_token(dir: &Path, token: &str) {
    std::fs::create_dir_all(dir).expect("create storage dir");
    std::fs::write(dir.join(credentials().cache_key()), token).expect("write token");
}

pub fn read_persisted(dir: &Path) -> Option<String> {
    std::fs::read_to_string(dir.join(credentials().cache_key())).ok()
}
