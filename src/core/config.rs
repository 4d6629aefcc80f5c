use std::collections::HashMap;

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use url::Url;

pub const ENV_PREFIX: &str = "LIVECHAT";
pub const ENV_SEPARATOR: &str = "__";

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClientKind {
    /// A live WebSocket connection to `<server_url>/ws/chat/<room_id>/`.
    Socket {
        room_id: String,
    },
    /// Fabricates inbound messages on an interval; no network.
    Dummy {
        #[serde_as(as = "Option<DisplayFromStr>")]
        interval_ms: Option<u64>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SinkKind {
    Transcript {},
    Logger {},
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base address of the chat server, e.g. `ws://localhost:8000`.
    pub server_url: Url,
    pub rooms: HashMap<String, RoomCfg>, // key = connection name
    #[serde(default)]
    pub sinks: HashMap<String, SinkCfg>, // key = sink name
    /// Room name stdin input is sent to. Defaults to the sole room when
    /// exactly one is configured.
    #[serde(default)]
    pub compose_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoomCfg {
    #[serde(flatten)]
    pub kind: ClientKind,
    #[serde(default, deserialize_with = "deserialize_sink_list")]
    pub sinks: Option<Vec<String>>, // List of sink names
}

fn deserialize_sink_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_string_list(deserializer)
}

fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrVec {
        String(String),
        Vec(Vec<String>),
    }

    let value: Option<StringOrVec> = Option::deserialize(deserializer)?;

    match value {
        None => Ok(None),
        Some(StringOrVec::Vec(vec)) => Ok(Some(vec)),
        Some(StringOrVec::String(s)) => {
            // Environment variables can only carry a comma-separated string
            let items: Vec<String> = s
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
            Ok(Some(items))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SinkCfg {
    #[serde(flatten)]
    pub kind: SinkKind,
}

pub fn load_from_env() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok(); // Load from .env file first
    let cfg = config::Config::builder()
        .add_source(config::File::with_name("livechat").required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR))
        .build()?;
    Ok(cfg.try_deserialize()?)
}
