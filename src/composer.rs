use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::core::{bus::Command, client::ClientId};

/// Reads lines from stdin and forwards each one as a send command for the
/// target room. Consuming the line is what clears the input; empty lines are
/// forwarded like any other.
pub struct Composer {
    client_id: ClientId,
    cmd_tx: Sender<Command>,
}

impl Composer {
    pub fn new(client_id: ClientId, cmd_tx: Sender<Command>) -> Self {
        Self { client_id, cmd_tx }
    }

    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("composer shutting down");
                    break;
                }
                maybe_line = lines.next_line() => {
                    let Some(line) = maybe_line? else {
                        info!("stdin closed");
                        break;
                    };
                    let command = Command::SendMessage {
                        client_id: self.client_id.clone(),
                        body: line,
                    };
                    if let Err(e) = self.cmd_tx.send(command).await {
                        error!(error=%e, "bus command receiver dropped");
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}
