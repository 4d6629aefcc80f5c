use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::client::ClientId;

#[derive(Debug, Serialize, Deserialize)]
pub struct Event {
    pub client_id: ClientId,
    pub kind: EventKind,
}

/// One variant per socket lifecycle callback: open, message, error, close.
#[derive(Debug, Serialize, Deserialize)]
pub enum EventKind {
    Connected,
    Message {
        /// Sender name as reported by the server; absent for anonymous frames.
        user: Option<String>,
        body: String,
    },
    SocketError {
        reason: String,
    },
    Closed {
        code: Option<u16>,
        reason: String,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", &self.client_id)?;
        match &self.kind {
            EventKind::Connected => {
                write!(f, "[Connected]")
            }
            EventKind::Message { user, body } => {
                write!(f, "[Message] {}: {body}", user.as_deref().unwrap_or("anonymous"))
            }
            EventKind::SocketError { reason } => {
                write!(f, "[Error] {reason}")
            }
            EventKind::Closed { code, reason } => match code {
                Some(code) => write!(f, "[Closed] {code}: {reason}"),
                None => write!(f, "[Closed] {reason}"),
            },
        }
    }
}
