//! XenForo REST API client.

mod client;
mod error;

pub use client::XenForoClient;
pub use error::{SearchStep, XfError};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_test_client(mock_server: &MockServer) -> XenForoClient {
        XenForoClient::new(
            mock_server.uri(),
            "test-api-key",
            Duration::from_secs(10),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_latest_threads_success() {
        let mock_server = MockServer::start().await;

        let response_body = serde_json::json!({
            "threads": [
                { "thread_id": 1, "title": "A", "username": "bob" },
                { "thread_id": 2, "title": "B", "username": "alice" }
            ]
        });

        Mock::given(method("GET"))
            .and(path("/api/threads"))
            .and(header("XF-Api-Key", "test-api-key"))
            .and(query_param("order", "post_date"))
            .and(query_param("direction", "desc"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.latest_threads(5).await;

        assert!(result.is_ok());
        let threads = result.unwrap();
        assert_eq!(threads["threads"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/threads"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.latest_threads(5).await;
        assert!(matches!(result, Err(XfError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/index"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.index().await;
        assert!(matches!(result, Err(XfError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/threads/42"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.thread(42).await;
        assert!(matches!(result, Err(XfError::NotFound)));
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/posts"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.latest_posts(5).await;
        assert!(matches!(result, Err(XfError::RateLimit)));
    }

    #[tokio::test]
    async fn test_other_status_maps_to_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/forums"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.forums().await;
        match result {
            Err(XfError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "down");
            }
            other => panic!("expected Api error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/index"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.index().await;
        assert!(matches!(result, Err(XfError::Json(_))));
    }

    #[tokio::test]
    async fn test_find_user_sends_username() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users/find-name"))
            .and(query_param("username", "张三"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "exact": { "username": "张三", "message_count": 7 }
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.find_user("张三").await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap()["exact"]["message_count"], 7);
    }

    #[tokio::test]
    async fn test_search_two_step_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/search"))
            .and(header("XF-Api-Key", "test-api-key"))
            .and(body_partial_json(serde_json::json!({
                "search_type": "post",
                "keywords": "rust"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "search": { "search_id": 99 }
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/search/99"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [ { "title": "Rust 入门", "thread_id": 3 } ]
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.search("rust").await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap()["results"][0]["thread_id"], 3);
    }

    #[tokio::test]
    async fn test_search_flat_search_id_shape() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "search_id": 7
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/search/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": []
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        assert!(client.search("x").await.is_ok());
    }

    #[tokio::test]
    async fn test_search_create_step_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.search("rust").await;
        match result {
            Err(XfError::Search { step, .. }) => assert_eq!(step, SearchStep::Create),
            other => panic!("expected Search error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_search_fetch_step_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "search": { "search_id": 11 }
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/search/11"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.search("rust").await;
        match result {
            Err(XfError::Search { step, source }) => {
                assert_eq!(step, SearchStep::Fetch);
                assert!(matches!(*source, XfError::NotFound));
            }
            other => panic!("expected Search error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_search_missing_search_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "search": {}
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.search("rust").await;
        match result {
            Err(XfError::Search { step, source }) => {
                assert_eq!(step, SearchStep::Create);
                assert!(matches!(*source, XfError::MissingSearchId));
            }
            other => panic!("expected Search error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_trimmed() {
        let client = XenForoClient::new(
            "https://forum.example.com/",
            "k",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://forum.example.com");
    }
}
