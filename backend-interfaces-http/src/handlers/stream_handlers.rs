use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use backend_application::AppState;
use backend_domain::{LootEntry, NEW_LOOT_EVENT};

pub async fn stream_loot(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| forward_loot(state, socket))
}

async fn forward_loot(state: AppState, socket: WebSocket) {
    let mut rx = state.stream_hub.subscribe();
    let (mut sender, mut receiver) = socket.split();
    debug!(
        subscribers = state.stream_hub.subscriber_count(),
        "loot stream subscriber connected"
    );

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(entry) => {
                    let frame = match stream_frame(&entry) {
                        Ok(frame) => frame,
                        Err(err) => {
                            warn!(id = %entry.id, "failed to encode stream frame: {}", err);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                // Slow subscribers skip what they missed; the next poll catches up.
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "loot stream subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("loot stream subscriber disconnected");
}

pub fn stream_frame(entry: &LootEntry) -> serde_json::Result<String> {
    serde_json::to_string(&json!({
        "event": NEW_LOOT_EVENT,
        "data": entry,
    }))
}
