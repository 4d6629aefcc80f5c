pub mod core {
    pub mod bus;
    pub mod client;
    pub mod config;
    pub mod event;
    pub mod sink;
}

pub mod clients {
    pub mod dummy;
    pub mod socket;
}

pub mod sinks {
    pub mod logger;
    pub mod transcript;
}

pub mod composer;
pub mod wire;
