use crate::utils::error::Result;
use async_trait::async_trait;

/// A conversational agent: free text in, formatted text out.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &'static str;

    /// Label reported by `GET /health`.
    fn health_label(&self) -> &'static str {
        self.name()
    }

    async fn handle(&self, message: &str) -> Result<String>;
}

/// Agent endpoint addresses used by the frontend and CLI.
pub trait AgentEndpoints: Send + Sync {
    fn doctor_agent_url(&self) -> &str;
    fn booking_agent_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
}
