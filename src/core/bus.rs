use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::client::{Client, ClientId};
use crate::core::event::Event;
use crate::core::sink::{Sink, Verdict};

#[derive(Debug)]
pub enum Command {
    /// Wrap `body` in an outbound envelope and transmit it on the client's
    /// socket. No acknowledgement, no retry.
    SendMessage { client_id: ClientId, body: String },
}

pub struct Bus {
    // Receive events from clients
    evt_rx: Receiver<Event>,

    // Receive commands from the composer and sinks
    cmd_rx: Receiver<Command>,

    clients: HashMap<ClientId, Arc<dyn Client>>,

    // Per-client sink pipelines
    client_sinks: HashMap<ClientId, Vec<Arc<dyn Sink>>>,
}

impl Bus {
    pub fn new(
        evt_rx: Receiver<Event>,
        cmd_rx: Receiver<Command>,
        clients: HashMap<ClientId, Arc<dyn Client>>,
        client_sinks: HashMap<ClientId, Vec<Arc<dyn Sink>>>,
    ) -> Self {
        Self { evt_rx, cmd_rx, clients, client_sinks }
    }

    pub async fn run(&mut self, cancel: CancellationToken) -> anyhow::Result<()> {
        info!("starting clients...");
        let mut client_tasks: JoinSet<(ClientId, anyhow::Result<()>)> = JoinSet::new();

        for (client_id, client) in &self.clients {
            let child_token = cancel.child_token();
            let client_clone = client.clone();
            let id = client_id.clone();

            client_tasks.spawn(async move {
                let result = client_clone.run(child_token).await;
                (id, result)
            });
        }

        // Start all sinks (collect unique instances across all clients)
        info!("starting sinks...");
        let mut sink_handles = Vec::new();
        let mut started_sinks: Vec<Arc<dyn Sink>> = Vec::new();

        for pipeline in self.client_sinks.values() {
            for sink in pipeline {
                // Use Arc::ptr_eq to track unique instances
                let already_started =
                    started_sinks.iter().any(|started| Arc::ptr_eq(started, sink));

                if !already_started {
                    started_sinks.push(sink.clone());
                    let child_token = cancel.child_token();
                    let sink_clone = sink.clone();
                    sink_handles
                        .push(tokio::spawn(async move { sink_clone.run(child_token).await }));
                }
            }
        }

        info!("starting event bus...");

        loop {
            tokio::select! {
                Some(Ok((exited_client_id, result))) = client_tasks.join_next() => {
                    if cancel.is_cancelled() {
                        info!(client_id=%exited_client_id, "client exited during shutdown");
                    } else {
                        // Reconnection is out of scope: report the exit and
                        // leave the remaining clients running.
                        match result {
                            Ok(()) => info!(client_id=%exited_client_id, "client exited; reconnect is not attempted"),
                            Err(e) => warn!(client_id=%exited_client_id, error=%e, "client exited with error; reconnect is not attempted"),
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received");
                    break;
                }
                maybe_evt = self.evt_rx.recv() => {
                    let Some(evt) = maybe_evt else { break };
                    debug!(event=%evt, "event received");

                    // Route the event through this client's sink pipeline
                    if let Some(pipeline) = self.client_sinks.get(&evt.client_id) {
                        for sink in pipeline {
                            match sink.on_event(&evt)? {
                                Verdict::Continue => {},
                                Verdict::Stop => { break; }
                            }
                        }
                    } else {
                        debug!(client_id=%evt.client_id, "no sink pipeline configured for client");
                    }
                }
                maybe_cmd = self.cmd_rx.recv() => {
                    let Some(cmd) = maybe_cmd else { break };
                    debug!(?cmd, "command received");

                    let Command::SendMessage { ref client_id, .. } = cmd;
                    let client_id = client_id.clone();

                    // Dispatch command to the owning client
                    if let Some(client) = self.clients.get(&client_id) {
                        if let Err(e) = client.handle_command(cmd).await {
                            error!(client_id=%client_id, error=%e, "failed to handle command");
                        }
                    } else {
                        warn!(client_id=%client_id, "command sent to unknown client");
                    }
                }
            }
        }
        info!("exited event bus");
        Ok(())
    }
}

// A small helper to make a Command channel pair available to the composer.
pub fn create_command_channel(cap: usize) -> (Sender<Command>, Receiver<Command>) {
    tokio::sync::mpsc::channel(cap)
}

// A small helper to make an Event channel pair available to clients.
pub fn create_event_channel(cap: usize) -> (Sender<Event>, Receiver<Event>) {
    tokio::sync::mpsc::channel(cap)
}
