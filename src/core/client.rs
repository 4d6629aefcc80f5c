use std::{collections::HashMap, fmt, sync::Arc};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    clients::{dummy::DummyClient, socket::SocketClient},
    core::{
        bus::Command,
        config::{ClientKind, Config},
        event::Event,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // write the inner string
        write!(f, "{}", self.0)
    }
}

#[async_trait::async_trait]
pub trait Client: Send + Sync {
    async fn run(&self, cancel: CancellationToken) -> Result<()>;
    async fn handle_command(&self, command: Command) -> Result<()>;
}

/// Instantiates a map of Clients based on given config
pub fn instantiate_clients_from_config(
    config: &Config,
    evt_tx: &Sender<Event>,
) -> Result<HashMap<ClientId, Arc<dyn Client>>> {
    let mut clients: HashMap<ClientId, Arc<dyn Client>> = HashMap::new();
    for (id, rcfg) in &config.rooms {
        let client_id = ClientId(id.clone());
        match &rcfg.kind {
            ClientKind::Socket { room_id } => {
                let client = Arc::new(SocketClient::new(
                    client_id.clone(),
                    &config.server_url,
                    room_id,
                    evt_tx.clone(),
                )?);
                clients.insert(client_id, client);
            }
            ClientKind::Dummy { interval_ms } => {
                let client = Arc::new(DummyClient {
                    id: client_id.clone(),
                    interval_ms: interval_ms.unwrap_or(1000),
                    evt_tx: evt_tx.clone(),
                });
                clients.insert(client_id, client);
            }
            ClientKind::Unknown => error!(id=%id, "unknown room kind, skipping"),
        }
    }
    Ok(clients)
}
