use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use futures::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, Sender};
use tokio_tungstenite::{connect_async, tungstenite::Message as TtMessage};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::core::bus::Command;
use crate::core::client::{Client, ClientId};
use crate::core::event::{Event, EventKind};
use crate::wire::{Inbound, Outbound};

/// Builds the room endpoint address from the server base URL, matching the
/// server's route `ws/chat/<room_id>/` (trailing slash included).
pub fn room_url(server_url: &Url, room_id: &str) -> Result<Url> {
    Ok(server_url.join(&format!("ws/chat/{room_id}/"))?)
}

pub struct SocketClient {
    id: ClientId,
    url: Url,
    evt_tx: Sender<Event>,
    out_tx: Arc<Mutex<Option<Sender<TtMessage>>>>,
}

impl SocketClient {
    pub fn new(
        id: ClientId,
        server_url: &Url,
        room_id: &str,
        evt_tx: Sender<Event>,
    ) -> Result<Self> {
        if room_id.is_empty() {
            return Err(anyhow!("room_id cannot be empty"));
        }

        Ok(Self {
            id,
            url: room_url(server_url, room_id)?,
            evt_tx,
            out_tx: Arc::new(Mutex::new(None)),
        })
    }

    async fn emit(&self, kind: EventKind) -> Result<()> {
        self.evt_tx.send(Event { client_id: self.id.clone(), kind }).await?;
        Ok(())
    }

    /// Parses an inbound text frame as an envelope. Malformed JSON propagates
    /// as-is; there is no validation or recovery here.
    async fn handle_text(&self, text: &str) -> Result<()> {
        let inbound: Inbound = serde_json::from_str(text)?;
        self.emit(EventKind::Message { user: inbound.user, body: inbound.message }).await
    }
}

#[async_trait::async_trait]
impl Client for SocketClient {
    async fn run(&self, cancel: CancellationToken) -> Result<()> {
        info!(id=%self.id, url=%self.url, "connecting to chat room");

        let (ws_stream, _) = connect_async(self.url.as_str()).await?;

        let (mut write, mut read) = ws_stream.split();

        // The send path has to be live before Connected is observable
        let (send_tx, mut send_rx) = mpsc::channel::<TtMessage>(32);
        *self.out_tx.lock().await = Some(send_tx);

        info!(id=%self.id, "websocket connected");
        self.emit(EventKind::Connected).await?;

        let result = loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(id=%self.id, "socket client shutting down");
                    break Ok(());
                }
                maybe_out = send_rx.recv() => {
                    let Some(frame) = maybe_out else { break Ok(()) };
                    if let Err(e) = write.send(frame).await {
                        error!(id=%self.id, error=%e, "failed to send frame");
                        break Err(e.into());
                    }
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(TtMessage::Text(text))) => {
                            debug!(id=%self.id, "received text frame");
                            if let Err(e) = self.handle_text(text.as_str()).await {
                                break Err(e);
                            }
                        }
                        Some(Ok(TtMessage::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (Some(u16::from(f.code)), f.reason.to_string()))
                                .unwrap_or((None, String::new()));
                            info!(id=%self.id, ?code, reason=%reason, "websocket disconnected");
                            self.emit(EventKind::Closed { code, reason }).await?;
                            break Ok(());
                        }
                        Some(Ok(other)) => {
                            // Ping/pong are answered by tungstenite; binary
                            // frames are not part of the chat protocol.
                            debug!(id=%self.id, "ignoring non-text frame: {:?}", other);
                        }
                        Some(Err(e)) => {
                            warn!(id=%self.id, error=%e, "websocket error");
                            self.emit(EventKind::SocketError { reason: e.to_string() }).await?;
                            break Err(e.into());
                        }
                        None => {
                            info!(id=%self.id, "websocket stream ended");
                            self.emit(EventKind::Closed {
                                code: None,
                                reason: "connection ended".to_string(),
                            })
                            .await?;
                            break Ok(());
                        }
                    }
                }
            }
        };

        *self.out_tx.lock().await = None;
        result
    }

    async fn handle_command(&self, command: Command) -> Result<()> {
        match command {
            Command::SendMessage { body, .. } => {
                // Empty input is sent as-is; the source had no guard.
                let frame = serde_json::to_string(&Outbound::new(body))?;
                let guard = self.out_tx.lock().await;
                match guard.as_ref() {
                    Some(tx) => tx
                        .send(TtMessage::Text(frame.into()))
                        .await
                        .map_err(|_| anyhow!("socket send queue is closed")),
                    None => bail!("socket is not open"),
                }
            }
        }
    }
}
