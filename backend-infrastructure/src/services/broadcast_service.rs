use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::{json, Value};

use backend_domain::ports::BroadcastService;
use backend_domain::{LootEntry, RuntimeConfig};

/// Posts `{name, channel, data}` messages to an HTTP pub/sub endpoint.
pub struct HttpBroadcastService {
    client: Client,
    url: String,
    channel: String,
    token: Option<String>,
}

impl HttpBroadcastService {
    pub fn new(url: String, channel: String, token: Option<String>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            client,
            url,
            channel,
            token,
        })
    }

    /// `None` when no broadcast url is configured.
    pub fn from_config(config: &RuntimeConfig) -> Result<Option<Self>> {
        let Some(url) = config.broadcast_url.clone() else {
            return Ok(None);
        };
        Self::new(
            url,
            config.broadcast_channel.clone(),
            config.broadcast_token.clone(),
            config.request_timeout_seconds,
        )
        .map(Some)
    }
}

#[async_trait]
impl BroadcastService for HttpBroadcastService {
    async fn publish(&self, event: &str, entry: &LootEntry) -> Result<()> {
        let payload = build_payload(event, &self.channel, entry)?;
        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        request
            .send()
            .await
            .with_context(|| format!("broadcast to {} failed", self.url))?
            .error_for_status()?;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Used when broadcasting is not configured.
#[derive(Default)]
pub struct NoopBroadcastService;

#[async_trait]
impl BroadcastService for NoopBroadcastService {
    async fn publish(&self, _event: &str, _entry: &LootEntry) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// `data` carries the entry serialized as a JSON string.
fn build_payload(event: &str, channel: &str, entry: &LootEntry) -> Result<Value> {
    Ok(json!({
        "name": event,
        "channel": channel,
        "data": serde_json::to_string(entry)?,
    }))
}
