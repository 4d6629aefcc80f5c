use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::{
    bus::Command,
    client::{Client, ClientId},
    event::{Event, EventKind},
};

pub struct DummyClient {
    pub id: ClientId,
    pub interval_ms: u64,
    pub evt_tx: tokio::sync::mpsc::Sender<Event>,
}

#[async_trait::async_trait]
impl Client for DummyClient {
    async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_millis(self.interval_ms));
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(client=%self.id, "shutdown requested");
                    break;
                }
                _ = interval.tick() => {
                    let msg = Event {
                        client_id: self.id.clone(),
                        kind: EventKind::Message{
                            user: Some("dummy".into()),
                            body: "hello from dummy".into()
                        }
                    };
                    if let Err(e) = self.evt_tx.send(msg).await {
                        tracing::error!(?e, "bus event receiver dropped");
                        break;
                    }
                }
            }
        }
        // Perform final cleanup here
        Ok(())
    }

    async fn handle_command(&self, command: Command) -> Result<()> {
        match command {
            Command::SendMessage { body, .. } => {
                info!(client=%self.id, body=%body, "dummy client: would send message");
            }
        }
        Ok(())
    }
}
