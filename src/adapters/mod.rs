// Adapters layer: concrete clients for external systems.

pub mod http;

pub use http::{AgentClient, AgentReply, EndpointStatus};
