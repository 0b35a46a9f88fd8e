use crate::domain::ports::AgentEndpoints;
use crate::utils::error::{AgentError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one message sent to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentReply {
    pub fn ok(data: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn into_result(self) -> std::result::Result<String, String> {
        if self.success {
            Ok(self.data.unwrap_or_default())
        } else {
            Err(self.error.unwrap_or_else(|| "Unknown error".to_string()))
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    success: bool,
    data: Option<serde_json::Value>,
    error: Option<String>,
}

/// Probe result for one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointStatus {
    /// HTTP status code, or `None` when the request itself failed.
    pub status: Option<u16>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// HTTP client for the doctor directory and booking agents.
#[derive(Debug, Clone)]
pub struct AgentClient {
    client: Client,
    doctor_agent_url: String,
    booking_agent_url: String,
}

impl AgentClient {
    pub fn new<E: AgentEndpoints + ?Sized>(endpoints: &E) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(endpoints.timeout_seconds()))
            .build()?;
        Ok(Self {
            client,
            doctor_agent_url: trim_url(endpoints.doctor_agent_url()),
            booking_agent_url: trim_url(endpoints.booking_agent_url()),
        })
    }

    pub fn doctor_agent_url(&self) -> &str {
        &self.doctor_agent_url
    }

    pub fn booking_agent_url(&self) -> &str {
        &self.booking_agent_url
    }

    /// Transport errors become a failed reply, never an `Err`.
    pub async fn send_message(&self, agent_url: &str, message: &str) -> AgentReply {
        match self.try_send_message(agent_url, message).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(agent_url, "agent request failed: {}", e);
                AgentReply::failed(e.user_friendly_message())
            }
        }
    }

    async fn try_send_message(&self, agent_url: &str, message: &str) -> Result<AgentReply> {
        tracing::debug!(agent_url, message, "sending message");
        let response = self
            .client
            .post(format!("{}/", agent_url))
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(AgentReply::failed(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let wire: WireResponse = response.json().await?;
        if wire.success {
            let data = match wire.data {
                Some(serde_json::Value::String(s)) => s,
                Some(serde_json::Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            Ok(AgentReply::ok(data))
        } else {
            Ok(AgentReply::failed(
                wire.error.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }

    pub async fn query_doctor_directory(&self, message: &str) -> AgentReply {
        self.send_message(&self.doctor_agent_url, message).await
    }

    pub async fn query_booking_agent(&self, message: &str) -> AgentReply {
        self.send_message(&self.booking_agent_url, message).await
    }

    pub async fn check_agent_status(&self, agent_url: &str) -> bool {
        match self
            .client
            .get(format!("{}/health", agent_url))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                tracing::debug!(agent_url, "health check failed: {}", e);
                false
            }
        }
    }

    /// Returns `AgentUnavailable` when the health check fails.
    pub async fn require_online(&self, agent_url: &str) -> Result<()> {
        if self.check_agent_status(agent_url).await {
            Ok(())
        } else {
            Err(AgentError::AgentUnavailable {
                url: agent_url.to_string(),
                reason: "health check failed".to_string(),
            })
        }
    }

    /// Probes `/health` with GET and `/` with a test message.
    pub async fn test_agent_endpoints(&self, agent_url: &str) -> BTreeMap<String, EndpointStatus> {
        let mut results = BTreeMap::new();

        let health = self
            .client
            .get(format!("{}/health", agent_url))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await;
        results.insert("/health".to_string(), endpoint_status(health));

        let root = self
            .client
            .post(format!("{}/", agent_url))
            .json(&serde_json::json!({ "message": "test connection" }))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await;
        results.insert("/".to_string(), endpoint_status(root));

        results
    }
}

fn endpoint_status(result: reqwest::Result<reqwest::Response>) -> EndpointStatus {
    match result {
        Ok(response) => {
            let code = response.status().as_u16();
            EndpointStatus {
                status: Some(code),
                available: code < 400,
                error: None,
            }
        }
        Err(e) => EndpointStatus {
            status: None,
            available: false,
            error: Some(e.to_string()),
        },
    }
}

fn trim_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_into_result() {
        assert_eq!(AgentReply::ok("hi".to_string()).into_result(), Ok("hi".to_string()));
        assert_eq!(
            AgentReply::failed("down").into_result(),
            Err("down".to_string())
        );
    }

    #[test]
    fn test_trim_url() {
        assert_eq!(trim_url("http://localhost:9998/"), "http://localhost:9998");
        assert_eq!(trim_url("http://localhost:9998"), "http://localhost:9998");
    }
}
