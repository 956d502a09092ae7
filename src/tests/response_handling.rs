#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::auth::TokenManager;
    use crate::cache::MemoryTokenStore;
    use crate::dispatch::{HttpTransport, RequestDispatcher};
    use crate::errors::{into_uniform, ApiError};
    use crate::tests::common::*;

    #[tokio::test]
    async fn non_json_body_is_invalid_response_for_any_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.path("/broken");
                then.status(502).body("<html>Bad Gateway</html>");
            })
            .await;
        let dir = tempfile::tempdir().unwrap();
        persist_token(dir.path(), "tok");

        let dispatcher = build_dispatcher(&server, dir.path());
        dispatcher.tokens().initialize().await.unwrap();

        let result = dispatcher.post("broken", json!({})).await;
        assert_eq!(result, Err(ApiError::InvalidResponse));
        assert_eq!(
            into_uniform(result),
            json!({"is_error": 1, "message": "Bad response from server"})
        );
    }

    #[tokio::test]
    async fn non_401_errors_pass_through_untouched() {
        let server = MockServer::start_async().await;
        let api = server
            .mock_async(|when, then| {
                when.method(POST).path("/smtp/emails").header("authorization", "Bearer tok");
                then.status(400).json_body(json!({"is_error": true, "message": "Sender is not valid"}));
            })
            .await;
        let dir = tempfile::tempdir().unwrap();
        persist_token(dir.path(), "tok");

        let dispatcher = build_dispatcher(&server, dir.path());
        dispatcher.tokens().initialize().await.unwrap();

        let body = dispatcher.post("smtp/emails", json!({"email": {}})).await.unwrap();
        assert_eq!(body, json!({"is_error": true, "message": "Sender is not valid"}));

        let checked = dispatcher
            .call_checked("smtp/emails", http::Method::POST, json!({"email": {}}))
            .await;
        match checked {
            Err(ApiError::Upstream { message, body }) => {
                assert_eq!(message.as_deref(), Some("Sender is not valid"));
                assert_eq!(body["is_error"], json!(true));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(api.hits_async().await, 2);
    }

    #[tokio::test]
    async fn put_and_delete_use_their_verbs() {
        let server = MockServer::start_async().await;
        let updated = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/addressbooks/7")
                    .header("authorization", "Bearer tok")
                    .json_body(json!({"name": "renamed"}));
                then.status(200).json_body(json!({"result": true}));
            })
            .await;
        let removed = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/addressbooks/7").header("authorization", "Bearer tok");
                then.status(200).json_body(json!({"result": true}));
            })
            .await;
        let dir = tempfile::tempdir().unwrap();
        persist_token(dir.path(), "tok");

        let dispatcher = build_dispatcher(&server, dir.path());
        dispatcher.tokens().initialize().await.unwrap();

        assert_eq!(
            dispatcher.put("addressbooks/7", json!({"name": "renamed"})).await.unwrap(),
            json!({"result": true})
        );
        assert_eq!(
            dispatcher.delete("addressbooks/7", json!({})).await.unwrap(),
            json!({"result": true})
        );
        assert_eq!(updated.hits_async().await, 1);
        assert_eq!(removed.hits_async().await, 1);
    }

    #[tokio::test]
    async fn token_endpoint_call_carries_no_bearer_and_never_refreshes() {
        let server = MockServer::start_async().await;
        let token_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/access_token");
                then.status(401).json_body(json!({"error": "unauthorized_client"}));
            })
            .await;
        let dir = tempfile::tempdir().unwrap();
        persist_token(dir.path(), "tok");

        let dispatcher = build_dispatcher(&server, dir.path());
        dispatcher.tokens().initialize().await.unwrap();

        let result = dispatcher.post("oauth/access_token", json!({"grant_type": "client_credentials"})).await;
        assert!(matches!(result, Err(ApiError::Upstream { .. })), "unexpected {:?}", result);
        assert_eq!(token_mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let transport = Arc::new(HttpTransport::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap());
        let store = MemoryTokenStore::new();
        let tokens = TokenManager::new(credentials(), transport, store.clone());
        let dispatcher = RequestDispatcher::new(Arc::new(tokens));

        let result = dispatcher.post("addressbooks", json!({})).await;
        match &result {
            Err(ApiError::Transport { code }) => assert!(!code.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(into_uniform(result)["is_error"], json!(1));

        // token endpoint failures surface the same way
        assert!(matches!(dispatcher.tokens().initialize().await, Err(ApiError::Transport { .. })));
        assert_eq!(store.writes(), 0);
    }
}
