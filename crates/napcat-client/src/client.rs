//! NapCat (OneBot HTTP API) client.

use crate::error::NapCatError;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Debug, Serialize)]
struct SendGroupMsgRequest<'a> {
    group_id: &'a str,
    message: &'a str,
}

/// NapCat OneBot HTTP API client.
#[derive(Clone)]
pub struct NapCatClient {
    client: Client,
    base_url: String,
}

impl NapCatClient {
    /// Create a new NapCat client.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, NapCatError> {
        let client = Client::builder().timeout(timeout).build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    /// Check if the NapCat API is reachable.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/get_status", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Send a text message to a group.
    ///
    /// `group_id` is passed through as received; NapCat accepts both
    /// string and numeric forms.
    #[instrument(skip(self, message))]
    pub async fn send_group_msg(&self, group_id: &str, message: &str) -> Result<(), NapCatError> {
        let request = SendGroupMsgRequest { group_id, message };

        let response = self
            .client
            .post(format!("{}/send_group_msg", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!("Send failed: {}", msg);
            return Err(NapCatError::SendFailed(msg));
        }

        // OneBot wraps the outcome in its own envelope.
        let body: Value = response.json().await?;
        let status = body.get("status").and_then(Value::as_str).unwrap_or("ok");
        let retcode = body.get("retcode").and_then(Value::as_i64).unwrap_or(0);
        if status == "failed" || retcode != 0 {
            warn!(retcode, "NapCat rejected the message");
            return Err(NapCatError::SendFailed(format!("retcode {}", retcode)));
        }

        debug!("Sent message to group {}", group_id);
        Ok(())
    }
}
