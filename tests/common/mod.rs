use async_trait::async_trait;
use livechat::core::bus::Command;
use livechat::core::client::{Client, ClientId};
use livechat::core::config::{ClientKind, Config, RoomCfg};
use livechat::core::event::{Event, EventKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Creates a test configuration with a single dummy room
#[allow(dead_code)] // Suppress spurious warning - some compilation units don't include this code.
pub fn create_test_config() -> Config {
    Config {
        server_url: Url::parse("ws://localhost:8000").unwrap(),
        rooms: {
            let mut rooms = HashMap::new();
            rooms.insert(
                "test_dummy".to_string(),
                RoomCfg { kind: ClientKind::Dummy { interval_ms: Some(100) }, sinks: None },
            );
            rooms
        },
        sinks: HashMap::new(),
        compose_to: None,
    }
}

/// Creates a test configuration with multiple dummy rooms
#[allow(dead_code)] // Suppress spurious warning - some compilation units don't include this code.
pub fn create_multi_room_config() -> Config {
    let mut rooms = HashMap::new();
    rooms.insert(
        "dummy1".to_string(),
        RoomCfg { kind: ClientKind::Dummy { interval_ms: Some(100) }, sinks: None },
    );
    rooms.insert(
        "dummy2".to_string(),
        RoomCfg { kind: ClientKind::Dummy { interval_ms: Some(200) }, sinks: None },
    );

    Config {
        server_url: Url::parse("ws://localhost:8000").unwrap(),
        rooms,
        sinks: HashMap::new(),
        compose_to: None,
    }
}

/// A controllable mock client that emits events on command and records the
/// commands it is asked to handle
#[allow(dead_code)] // Used by integration tests, not unit tests
pub struct MockClient {
    pub id: ClientId,
    pub evt_tx: mpsc::Sender<Event>,
    /// Commands to emit events (send event count to this channel)
    pub trigger_rx: Arc<Mutex<mpsc::Receiver<usize>>>,
    /// Bodies of SendMessage commands handled so far
    pub sent_bodies: Arc<Mutex<Vec<String>>>,
}

impl MockClient {
    /// Create a new mock client with a trigger channel for controlling event emission
    #[allow(dead_code)] // Used by integration tests, not unit tests
    pub fn new(id: ClientId, evt_tx: mpsc::Sender<Event>) -> (Self, mpsc::Sender<usize>) {
        let (trigger_tx, trigger_rx) = mpsc::channel(10);

        let client = MockClient {
            id,
            evt_tx,
            trigger_rx: Arc::new(Mutex::new(trigger_rx)),
            sent_bodies: Arc::new(Mutex::new(Vec::new())),
        };

        (client, trigger_tx)
    }
}

#[async_trait]
impl Client for MockClient {
    async fn run(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        let mut trigger_rx = self.trigger_rx.lock().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    break;
                }
                maybe_count = trigger_rx.recv() => {
                    let Some(count) = maybe_count else { break };

                    // Emit the requested number of message events
                    for i in 0..count {
                        let event = Event {
                            client_id: self.id.clone(),
                            kind: EventKind::Message {
                                user: Some(format!("user_{}", i)),
                                body: format!("test message {}", i),
                            },
                        };

                        if self.evt_tx.send(event).await.is_err() {
                            // Channel closed, client should stop
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn handle_command(&self, command: Command) -> anyhow::Result<()> {
        let Command::SendMessage { body, .. } = command;
        self.sent_bodies.lock().await.push(body);
        Ok(())
    }
}
