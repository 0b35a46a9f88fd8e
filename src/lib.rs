pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod frontend;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::AgentsArgs;

pub use adapters::{AgentClient, AgentReply};
pub use config::{ClientConfig, FrontendConfig, ServerConfig};
pub use core::{BookingAgent, DataStore, DoctorDirectoryAgent};
pub use server::RunMode;
pub use utils::error::{AgentError, Result};
