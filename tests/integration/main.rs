#[path = "../common/mod.rs"]
mod common;

mod event_flow;
