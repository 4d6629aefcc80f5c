use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use livechat::composer::Composer;
use livechat::core::{bus, client, config::load_from_env, sink};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_tracing();

    info!("starting...");

    info!("loading configuration...");
    let cfg = load_from_env()?;

    // Event channel: many producers (clients) -> one consumer (bus)
    let (evt_tx, evt_rx) = bus::create_event_channel(1024);
    // Command channel: many producers (composer) -> one consumer (bus)
    let (cmd_tx, cmd_rx) = bus::create_command_channel(1024);

    info!("instantiating clients...");
    let clients = client::instantiate_clients_from_config(&cfg, &evt_tx)?;

    info!("instantiating sinks...");
    let all_sinks = sink::instantiate_sinks_from_config(&cfg)?;

    info!("building client sink pipelines...");
    let mut client_sinks = std::collections::HashMap::new();
    for (room_name, room_cfg) in &cfg.rooms {
        if let Some(ref sink_list) = room_cfg.sinks {
            let pipeline = sink::build_sink_pipeline(sink_list, &all_sinks)?;
            client_sinks.insert(client::ClientId(room_name.clone()), pipeline);
        }
    }

    let cancel_all = CancellationToken::new();

    // Wire stdin to the room it composes into
    let compose_to = cfg.compose_to.clone().or_else(|| {
        if cfg.rooms.len() == 1 { cfg.rooms.keys().next().cloned() } else { None }
    });
    let composer_task = match compose_to {
        Some(room_name) if cfg.rooms.contains_key(&room_name) => {
            let composer = Composer::new(client::ClientId(room_name), cmd_tx.clone());
            let composer_cancel = cancel_all.child_token();
            Some(tokio::spawn(async move { composer.run(composer_cancel).await }))
        }
        Some(room_name) => {
            warn!(room=%room_name, "compose_to names an unknown room; input disabled");
            None
        }
        None => {
            warn!("multiple rooms and no compose_to set; input disabled");
            None
        }
    };

    // Start bus
    let bus_cancel = cancel_all.child_token();
    let bus_task = tokio::spawn({
        async move { bus::Bus::new(evt_rx, cmd_rx, clients, client_sinks).run(bus_cancel).await }
    });

    // Graceful shutdown on Ctrl+C
    tokio::signal::ctrl_c().await?;
    info!("Ctrl+C received; shutting down…");
    cancel_all.cancel();

    // Join bus
    match bus_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(?e, "bus error"),
        Err(e) => warn!(?e, "bus task panicked/aborted"),
    }
    if let Some(task) = composer_task {
        if let Err(e) = task.await {
            warn!(?e, "composer task panicked/aborted");
        }
    }

    info!("goodbye");
    Ok(())
}

fn init_tracing() {
    // Set a default log level for all crates (warn), then allow RUST_LOG to override
    // This prevents debug noise from dependencies when setting RUST_LOG=livechat=debug
    //
    // Examples:
    //   RUST_LOG=livechat=debug                 - Only livechat at debug, everything else at warn
    //   RUST_LOG=debug                          - Everything at debug
    //   RUST_LOG=livechat=debug,tungstenite=info - livechat at debug, tungstenite at info, rest at warn
    let filter =
        EnvFilter::builder().with_default_directive(tracing::Level::WARN.into()).from_env_lossy();

    fmt().with_env_filter(filter).init();
}
