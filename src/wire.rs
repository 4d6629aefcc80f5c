//! The JSON envelope exchanged over the chat socket.
//!
//! Outbound frames carry `{"message": "<text>"}`; the `user` field is never
//! serialized when absent. Inbound frames are `{"user": ..., "message": ...}`,
//! where the server's chatbot consumer writes `sender` instead of `user`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct Outbound {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Outbound {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), user: None }
    }
}

#[derive(Debug, Deserialize)]
pub struct Inbound {
    #[serde(default, alias = "sender")]
    pub user: Option<String>,
    pub message: String,
}
