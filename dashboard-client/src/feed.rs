// Background feed tasks: a poller (replace) and a push subscriber (append)

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use backend_domain::{LootEntry, LootPage, NEW_LOOT_EVENT};

use crate::api::{FeedQuery, LootApiClient};

#[derive(Debug, Clone)]
pub enum FeedUpdate {
    Replace(LootPage),
    Append(LootEntry),
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub poll_interval: Duration,
    pub push: bool,
    pub reconnect_delay: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            push: false,
            reconnect_delay: Duration::from_secs(3),
        }
    }
}

/// Owns the background tasks; dropping it cancels them.
pub struct FeedTasks {
    handles: Vec<JoinHandle<()>>,
}

impl Drop for FeedTasks {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

pub fn spawn_feed(
    client: Arc<LootApiClient>,
    query: FeedQuery,
    config: FeedConfig,
) -> (FeedTasks, mpsc::UnboundedReceiver<FeedUpdate>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut handles = Vec::with_capacity(2);

    if config.push {
        handles.push(tokio::spawn(run_push(
            client.stream_url(),
            config.reconnect_delay,
            tx.clone(),
        )));
    }
    handles.push(tokio::spawn(run_poller(
        client,
        query,
        config.poll_interval,
        tx,
    )));

    (FeedTasks { handles }, rx)
}

async fn run_poller(
    client: Arc<LootApiClient>,
    query: FeedQuery,
    period: Duration,
    tx: mpsc::UnboundedSender<FeedUpdate>,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        match client.fetch_page(&query).await {
            Ok(page) => {
                if tx.send(FeedUpdate::Replace(page)).is_err() {
                    break;
                }
            }
            // The next tick is the retry.
            Err(err) => warn!("loot poll failed: {}", err),
        }
    }
}

async fn run_push(url: String, reconnect_delay: Duration, tx: mpsc::UnboundedSender<FeedUpdate>) {
    while !tx.is_closed() {
        match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((ws, _)) => {
                debug!("subscribed to {}", url);
                let (_, mut read) = ws.split();
                while let Some(message) = read.next().await {
                    match message {
                        Ok(Message::Text(text)) => {
                            let Some(entry) = parse_push_frame(&text) else {
                                continue;
                            };
                            if tx.send(FeedUpdate::Append(entry)).is_err() {
                                return;
                            }
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(err) => {
                            warn!("loot stream dropped: {}", err);
                            break;
                        }
                    }
                }
            }
            Err(err) => warn!("loot stream connect failed: {}", err),
        }
        tokio::time::sleep(reconnect_delay).await;
    }
}

#[derive(Deserialize)]
struct PushFrame {
    #[serde(alias = "name")]
    event: String,
    data: Value,
}

/// Accepts `{"event":"new-loot","data":{..}}` and the pub/sub form where
/// `data` holds the entry as a JSON string.
pub fn parse_push_frame(text: &str) -> Option<LootEntry> {
    let frame: PushFrame = serde_json::from_str(text).ok()?;
    if frame.event != NEW_LOOT_EVENT {
        return None;
    }
    match frame.data {
        Value::String(raw) => serde_json::from_str(&raw).ok(),
        value => serde_json::from_value(value).ok(),
    }
}
