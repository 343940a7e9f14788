//! Jetstream firehose subscription.
//!
//! Connects to a Jetstream endpoint over websocket and delivers decoded
//! [`FirehoseEvent`]s through an mpsc channel, one at a time. The
//! subscription task owns the connection: transport failures are logged
//! and followed by a reconnect after a fixed delay, so a dropped socket
//! never surfaces to the consumer. The channel closes only when the
//! consumer side is dropped.

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::event::FirehoseEvent;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Configuration for a firehose subscription.
#[derive(Debug, Clone)]
pub struct FirehoseConfig {
    /// Jetstream websocket endpoint.
    pub service: String,
    /// Collections to request server-side filtering for. Empty = everything.
    pub collections: Vec<String>,
}

impl Default for FirehoseConfig {
    fn default() -> Self {
        Self {
            service: "wss://jetstream2.us-east.bsky.network/subscribe".to_string(),
            collections: Vec::new(),
        }
    }
}

impl FirehoseConfig {
    fn endpoint_url(&self) -> String {
        if self.collections.is_empty() {
            self.service.clone()
        } else {
            let wanted: Vec<String> = self
                .collections
                .iter()
                .map(|c| format!("wantedCollections={c}"))
                .collect();
            format!("{}?{}", self.service, wanted.join("&"))
        }
    }
}

/// Start a firehose subscription. Returns the event receiver; the
/// connection task runs until the receiver is dropped.
pub fn subscribe(config: FirehoseConfig) -> mpsc::Receiver<FirehoseEvent> {
    let (tx, rx) = mpsc::channel(256);
    tokio::spawn(run(config, tx));
    rx
}

async fn run(config: FirehoseConfig, tx: mpsc::Sender<FirehoseEvent>) {
    let url = config.endpoint_url();
    loop {
        match connect_async(url.as_str()).await {
            Ok((stream, _response)) => {
                tracing::info!(service = %config.service, "firehose connected");
                let (_sink, mut source) = stream.split();
                loop {
                    let Some(frame) = source.next().await else {
                        tracing::warn!("firehose stream closed by server");
                        break;
                    };
                    match frame {
                        Ok(WsMessage::Text(text)) => {
                            // Frames that don't decode are firehose noise.
                            if let Some(event) = FirehoseEvent::parse(&text) {
                                if tx.send(event).await.is_err() {
                                    // Consumer gone; stop the task.
                                    return;
                                }
                            }
                        }
                        Ok(_) => {}
                        Err(err) => {
                            tracing::error!(error = %err, "firehose read error");
                            break;
                        }
                    }
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "firehose connect error");
            }
        }
        if tx.is_closed() {
            return;
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
