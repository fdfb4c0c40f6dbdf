// src/types.rs
use crate::drivers::StoredConfig;

// Where samples come from
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum ConnectionMode {
    Simulation,
    Network { data_addr: String, control_addr: String },
}

// GUI -> engine
#[derive(Clone, Debug)]
pub enum GuiCommand {
    ApplyConfig(StoredConfig),
    Shutdown,
}

// engine -> GUI
#[derive(Clone, Debug)]
pub enum EngineMessage {
    Log(String),
    Status(bool),
    Frame(Vec<u8>),
    ConfigApplied(StoredConfig),
    ConfigRejected(String),
}
