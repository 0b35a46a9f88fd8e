//! HTTP handlers for an agent server.

use crate::domain::ports::Agent;
use crate::utils::error::{AgentError, Result};
use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// State shared by the handlers of one agent server.
#[derive(Clone)]
pub struct AgentState {
    pub agent: Arc<dyn Agent>,
}

/// Body returned by `POST /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl MessageResponse {
    pub fn success(data: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: timestamp(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub agent: String,
    pub timestamp: String,
}

pub fn timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Pulls the user text out of the accepted envelopes: `{"data": ..}`,
/// JSON-RPC style `{"params": {"data": ..}}`, `{"message": ..}`, or any other
/// JSON value rendered as text.
pub fn extract_message(body: &Value) -> String {
    let picked = match body {
        Value::Object(map) => map
            .get("data")
            .or_else(|| map.get("params").and_then(|p| p.get("data")))
            .or_else(|| map.get("message")),
        _ => None,
    };
    value_to_text(picked.unwrap_or(body))
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub async fn handle_health(State(state): State<AgentState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        agent: state.agent.health_label().to_string(),
        timestamp: timestamp(),
    })
}

async fn process_message(state: &AgentState, body: &[u8]) -> Result<String> {
    let value: Value = serde_json::from_slice(body)?;
    let message = extract_message(&value);
    if message.trim().is_empty() {
        return Err(AgentError::InvalidMessage {
            message: "message is empty".to_string(),
        });
    }
    debug!(agent = state.agent.name(), %message, "message received");
    state.agent.handle(&message).await
}

/// Main message handler. The body is read raw so malformed JSON gets the
/// same error envelope as agent failures.
pub async fn handle_message(State(state): State<AgentState>, body: Bytes) -> impl IntoResponse {
    match process_message(&state, &body).await {
        Ok(data) => (StatusCode::OK, Json(MessageResponse::success(data))),
        Err(e) => {
            error!(agent = state.agent.name(), "request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse::error(e.to_string())),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_message_envelopes() {
        assert_eq!(extract_message(&json!({"data": "list doctors"})), "list doctors");
        assert_eq!(
            extract_message(&json!({"jsonrpc": "2.0", "params": {"data": "slots for dr001"}})),
            "slots for dr001"
        );
        assert_eq!(extract_message(&json!({"message": "hello"})), "hello");
        assert_eq!(extract_message(&json!("plain text")), "plain text");
    }

    #[test]
    fn test_extract_message_prefers_data_over_message() {
        assert_eq!(
            extract_message(&json!({"message": "ignored", "data": "used"})),
            "used"
        );
    }

    #[test]
    fn test_extract_message_falls_back_to_json_text() {
        assert_eq!(extract_message(&json!({"foo": 1})), r#"{"foo":1}"#);
        assert_eq!(extract_message(&json!(42)), "42");
        assert_eq!(extract_message(&json!({"data": 7})), "7");
    }

    #[test]
    fn test_response_serialization_skips_absent_fields() {
        let ok = serde_json::to_value(MessageResponse::success("hi".to_string())).unwrap();
        assert_eq!(ok["success"], json!(true));
        assert_eq!(ok["data"], json!("hi"));
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(MessageResponse::error("boom".to_string())).unwrap();
        assert_eq!(err["success"], json!(false));
        assert!(err.get("data").is_none());
    }
}
