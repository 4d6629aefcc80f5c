use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::{
    event::{Event, EventKind},
    sink::{Sink, Verdict},
};

/// Emits a diagnostic log line for every socket lifecycle event.
pub struct Logger {}

#[async_trait]
impl Sink for Logger {
    async fn run(&self, cancel: CancellationToken) -> Result<()> {
        cancel.cancelled().await;
        Ok(())
    }

    fn on_event(&self, event: &Event) -> Result<Verdict> {
        match &event.kind {
            EventKind::Connected => {
                tracing::info!(client=%event.client_id, "websocket connected");
            }
            EventKind::Message { user, body } => {
                tracing::info!(
                    client=%event.client_id,
                    user=%user.as_deref().unwrap_or("anonymous"),
                    body=%body,
                    "received message"
                );
            }
            EventKind::SocketError { reason } => {
                tracing::error!(client=%event.client_id, reason=%reason, "websocket error");
            }
            EventKind::Closed { code, reason } => {
                tracing::info!(client=%event.client_id, ?code, reason=%reason, "websocket disconnected");
            }
        }
        Ok(Verdict::Continue)
    }
}
