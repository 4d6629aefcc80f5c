use std::{collections::HashMap, sync::Arc};

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::core::config::{Config, SinkKind};
use crate::core::event::Event;
use crate::sinks::{logger::Logger, transcript::TranscriptSink};

#[derive(Debug, Clone, Copy)]
pub enum Verdict {
    Continue,
    #[allow(dead_code)]
    Stop, // This will be used eventually.
}

#[async_trait]
pub trait Sink: Send + Sync {
    async fn run(&self, cancel: CancellationToken) -> Result<()>;
    fn on_event(&self, event: &Event) -> Result<Verdict>;
}

/// Instantiates sink instances from config as a HashMap keyed by sink name
pub fn instantiate_sinks_from_config(config: &Config) -> Result<HashMap<String, Arc<dyn Sink>>> {
    let mut sinks = HashMap::new();

    for (name, cfg) in &config.sinks {
        let sink: Arc<dyn Sink> = match &cfg.kind {
            SinkKind::Transcript {} => Arc::new(TranscriptSink::to_stdout()),
            SinkKind::Logger {} => Arc::new(Logger {}),
            SinkKind::Unknown => {
                warn!(sink_name=%name, "unknown sink kind, skipping");
                continue;
            }
        };
        sinks.insert(name.clone(), sink);
    }

    Ok(sinks)
}

/// Builds a Vec of sink instances from a list of sink names
pub fn build_sink_pipeline(
    sink_names: &[String],
    all_sinks: &HashMap<String, Arc<dyn Sink>>,
) -> Result<Vec<Arc<dyn Sink>>> {
    let mut pipeline = Vec::new();

    for name in sink_names {
        match all_sinks.get(name) {
            Some(sink) => pipeline.push(sink.clone()),
            None => {
                bail!("sink '{}' referenced but not defined in config", name);
            }
        }
    }

    Ok(pipeline)
}
