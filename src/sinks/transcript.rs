use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use tokio_util::sync::CancellationToken;

use crate::core::{
    event::{Event, EventKind},
    sink::{Sink, Verdict},
};

/// The display surface: an append-only line buffer of rendered messages.
#[derive(Debug, Default)]
pub struct Transcript {
    lines: Mutex<Vec<String>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Appends one `user: message` line to the transcript per inbound message.
/// Message text is interpolated as-is; sanitization is out of scope.
pub struct TranscriptSink {
    transcript: Arc<Transcript>,
    echo_to_stdout: bool,
}

impl TranscriptSink {
    /// Transcript mirrored to stdout; used by the main wiring.
    pub fn to_stdout() -> Self {
        Self { transcript: Arc::new(Transcript::new()), echo_to_stdout: true }
    }

    /// Renders into a caller-owned transcript without touching stdout.
    pub fn with_transcript(transcript: Arc<Transcript>) -> Self {
        Self { transcript, echo_to_stdout: false }
    }

    pub fn transcript(&self) -> Arc<Transcript> {
        self.transcript.clone()
    }
}

#[async_trait]
impl Sink for TranscriptSink {
    async fn run(&self, cancel: CancellationToken) -> Result<()> {
        tracing::info!("transcript sink running...");
        cancel.cancelled().await;
        tracing::info!("transcript sink shutting down...");
        Ok(())
    }

    fn on_event(&self, event: &Event) -> Result<Verdict> {
        if let EventKind::Message { user, body } = &event.kind {
            let line = format!(
                "[{}] {}: {}",
                Local::now().format("%H:%M"),
                user.as_deref().unwrap_or("anonymous"),
                body
            );
            if self.echo_to_stdout {
                println!("{line}");
            }
            self.transcript.append(line);
        }

        Ok(Verdict::Continue)
    }
}
