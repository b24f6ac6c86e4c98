//! XenForo REST API HTTP client.

use crate::error::{SearchStep, XfError};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// XenForo REST API client.
///
/// The API key is stored using `SecretString` to prevent accidental
/// exposure in logs or debug output. Every operation is a single
/// request-response cycle: no retries, no caching.
#[derive(Clone)]
pub struct XenForoClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl XenForoClient {
    /// Create a new XenForo client.
    ///
    /// A trailing slash on `base_url` is trimmed so link formatting can
    /// join paths unconditionally.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, XfError> {
        let client = Client::builder().timeout(timeout).build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            client,
            base_url,
            api_key: SecretString::new(api_key.into()),
        })
    }

    /// Get the configured base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Latest threads, newest first.
    #[instrument(skip(self))]
    pub async fn latest_threads(&self, limit: u32) -> Result<Value, XfError> {
        self.get(
            "/api/threads",
            &[
                ("order", "post_date".into()),
                ("direction", "desc".into()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// Threads ordered by reply count.
    ///
    /// The API's reply-count ordering is unreliable; callers fetch twice
    /// the display limit and re-sort the batch themselves.
    #[instrument(skip(self))]
    pub async fn hot_threads(&self, fetch: u32) -> Result<Value, XfError> {
        self.get(
            "/api/threads",
            &[
                ("order", "reply_count".into()),
                ("direction", "desc".into()),
                ("limit", fetch.to_string()),
            ],
        )
        .await
    }

    /// A single thread by ID.
    #[instrument(skip(self))]
    pub async fn thread(&self, id: u64) -> Result<Value, XfError> {
        self.get(&format!("/api/threads/{}", id), &[]).await
    }

    /// Latest posts across the board, newest first.
    #[instrument(skip(self))]
    pub async fn latest_posts(&self, limit: u32) -> Result<Value, XfError> {
        self.get(
            "/api/posts",
            &[
                ("order", "post_date".into()),
                ("direction", "desc".into()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// Look up a user by exact name.
    #[instrument(skip(self))]
    pub async fn find_user(&self, username: &str) -> Result<Value, XfError> {
        self.get("/api/users/find-name", &[("username", username.to_string())])
            .await
    }

    /// Forum (node) listing.
    #[instrument(skip(self))]
    pub async fn forums(&self) -> Result<Value, XfError> {
        self.get("/api/forums", &[]).await
    }

    /// Board index, including site statistics.
    #[instrument(skip(self))]
    pub async fn index(&self) -> Result<Value, XfError> {
        self.get("/api/index", &[]).await
    }

    /// Full-text search, two-step protocol.
    ///
    /// Step 1 creates the search and yields an opaque `search_id`; step 2
    /// polls page 1 of the ranked results. A failure at either step is
    /// reported as a single [`XfError::Search`] naming the failing step.
    #[instrument(skip(self))]
    pub async fn search(&self, keyword: &str) -> Result<Value, XfError> {
        let created = self
            .post(
                "/api/search",
                &json!({ "search_type": "post", "keywords": keyword }),
            )
            .await
            .map_err(|e| e.in_search_step(SearchStep::Create))?;

        // Newer API versions nest the id under "search".
        let search_id = created
            .get("search")
            .and_then(|s| s.get("search_id"))
            .or_else(|| created.get("search_id"))
            .and_then(Value::as_u64)
            .ok_or(XfError::MissingSearchId)
            .map_err(|e| e.in_search_step(SearchStep::Create))?;

        debug!(search_id, "Search created, fetching results");

        self.get(&format!("/api/search/{}", search_id), &[("page", "1".into())])
            .await
            .map_err(|e| e.in_search_step(SearchStep::Fetch))
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, XfError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("XF-Api-Key", self.api_key.expose_secret())
            .query(query)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, XfError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("XF-Api-Key", self.api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle HTTP response, converting errors appropriately.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value, XfError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            // char-based preview: payloads are mostly CJK text
            let preview: String = body.chars().take(200).collect();
            debug!("Response body: {}", preview);
            serde_json::from_str(&body).map_err(XfError::from)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract error information from failed response.
    async fn extract_error(&self, response: reqwest::Response) -> XfError {
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Authentication failed");
                XfError::Unauthorized
            }
            StatusCode::NOT_FOUND => XfError::NotFound,
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate limit exceeded");
                XfError::RateLimit
            }
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".into());
                XfError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}
