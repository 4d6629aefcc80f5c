use crate::common::MockClient;
use livechat::core::{
    bus::{Bus, Command, create_command_channel, create_event_channel},
    client::{Client, ClientId},
    sink::Sink,
};
use livechat::sinks::transcript::{Transcript, TranscriptSink};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_events_flow_through_transcript_pipeline() {
    // Keep _cmd_tx alive so the bus command arm stays open
    let (_cmd_tx, cmd_rx) = create_command_channel(10);
    let (evt_tx, evt_rx) = create_event_channel(10);

    let mock_id = ClientId("mock".to_string());
    let (mock, trigger_tx) = MockClient::new(mock_id.clone(), evt_tx.clone());

    let mut clients: HashMap<ClientId, Arc<dyn Client>> = HashMap::new();
    clients.insert(mock_id.clone(), Arc::new(mock));

    let transcript = Arc::new(Transcript::new());
    let sink: Arc<dyn Sink> = Arc::new(TranscriptSink::with_transcript(transcript.clone()));
    let mut client_sinks = HashMap::new();
    client_sinks.insert(mock_id, vec![sink]);

    let mut bus = Bus::new(evt_rx, cmd_rx, clients, client_sinks);

    let cancel_token = CancellationToken::new();
    let bus_handle = {
        let cancel = cancel_token.clone();
        tokio::spawn(async move { bus.run(cancel).await })
    };

    // Ask the mock client to emit three message events
    trigger_tx.send(3).await.expect("trigger send should succeed");

    // Give the bus time to route them
    tokio::time::sleep(Duration::from_millis(100)).await;

    let lines = transcript.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("user_0"));
    assert!(lines[0].contains("test message 0"));

    cancel_token.cancel();
    assert_ok!(bus_handle.await.unwrap());
}

#[tokio::test]
async fn test_commands_are_dispatched_to_owning_client() {
    let (cmd_tx, cmd_rx) = create_command_channel(10);
    let (evt_tx, evt_rx) = create_event_channel(10);

    let mock_id = ClientId("mock".to_string());
    let (mock, _trigger_tx) = MockClient::new(mock_id.clone(), evt_tx.clone());
    let sent_bodies = mock.sent_bodies.clone();

    let mut clients: HashMap<ClientId, Arc<dyn Client>> = HashMap::new();
    clients.insert(mock_id.clone(), Arc::new(mock));

    let mut bus = Bus::new(evt_rx, cmd_rx, clients, HashMap::new());

    let cancel_token = CancellationToken::new();
    let bus_handle = {
        let cancel = cancel_token.clone();
        tokio::spawn(async move { bus.run(cancel).await })
    };

    cmd_tx
        .send(Command::SendMessage { client_id: mock_id, body: "hi".to_string() })
        .await
        .expect("command send should succeed");

    tokio::time::sleep(Duration::from_millis(100)).await;

    let bodies = sent_bodies.lock().await;
    assert_eq!(*bodies, vec!["hi".to_string()]);
    drop(bodies);

    cancel_token.cancel();
    assert_ok!(bus_handle.await.unwrap());
}

#[tokio::test]
async fn test_command_for_unknown_client_is_logged_not_fatal() {
    let (cmd_tx, cmd_rx) = create_command_channel(10);
    let (_evt_tx, evt_rx) = create_event_channel(10);

    let mut bus = Bus::new(evt_rx, cmd_rx, HashMap::new(), HashMap::new());

    let cancel_token = CancellationToken::new();
    let bus_handle = {
        let cancel = cancel_token.clone();
        tokio::spawn(async move { bus.run(cancel).await })
    };

    cmd_tx
        .send(Command::SendMessage {
            client_id: ClientId("nobody".to_string()),
            body: "hi".to_string(),
        })
        .await
        .expect("command send should succeed");

    tokio::time::sleep(Duration::from_millis(50)).await;

    cancel_token.cancel();
    assert_ok!(bus_handle.await.unwrap());
}
