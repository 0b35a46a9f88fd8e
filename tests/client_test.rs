use clinic_agents::{AgentClient, ClientConfig};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn client_for(doctor_url: String, booking_url: String) -> AgentClient {
    let config = ClientConfig {
        doctor_agent_url: doctor_url,
        booking_agent_url: booking_url,
        timeout_seconds: 5,
    };
    AgentClient::new(&config).unwrap()
}

/// A URL nothing is listening on.
fn closed_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_send_message_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/")
            .json_body(json!({"message": "list doctors"}));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "success": true,
                "data": "Available doctors:\n• Dr. Sarah Johnson",
                "timestamp": "2025-05-28T10:00:00.000000"
            }));
    });

    let client = client_for(server.base_url(), closed_url());
    let reply = client.query_doctor_directory("list doctors").await;

    mock.assert();
    assert!(reply.success);
    assert_eq!(
        reply.data.as_deref(),
        Some("Available doctors:\n• Dr. Sarah Johnson")
    );
    assert!(reply.error.is_none());
}

#[tokio::test]
async fn test_send_message_non_2xx() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/");
        then.status(503).body("maintenance");
    });

    let client = client_for(closed_url(), server.base_url());
    let reply = client.query_booking_agent("list all appointments").await;

    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("HTTP 503: maintenance"));
}

#[tokio::test]
async fn test_send_message_reports_agent_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/");
        then.status(200)
            .json_body(json!({"success": false, "error": "message is empty"}));
    });

    let client = client_for(server.base_url(), closed_url());
    let reply = client.query_doctor_directory(" ").await;
    assert_eq!(reply.into_result(), Err("message is empty".to_string()));
}

#[tokio::test]
async fn test_connection_failure() {
    let client = client_for(closed_url(), closed_url());
    let reply = client.query_doctor_directory("list doctors").await;

    assert!(!reply.success);
    assert_eq!(
        reply.error.as_deref(),
        Some("Connection failed. Make sure the agent server is running.")
    );
    assert!(!client.check_agent_status(client.doctor_agent_url()).await);
    assert!(client.require_online(client.doctor_agent_url()).await.is_err());
}

#[tokio::test]
async fn test_slow_agent_times_out() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/");
        then.status(200)
            .delay(Duration::from_secs(3))
            .json_body(json!({"success": true, "data": "too late"}));
    });

    let client = AgentClient::new(&ClientConfig {
        doctor_agent_url: server.base_url(),
        booking_agent_url: closed_url(),
        timeout_seconds: 1,
    })
    .unwrap();
    let reply = client.query_doctor_directory("list doctors").await;

    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("Request timed out."));
}

#[tokio::test]
async fn test_check_agent_status_requires_200() {
    let healthy = MockServer::start();
    healthy.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200).json_body(json!({"status": "ok"}));
    });
    let failing = MockServer::start();
    failing.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(500);
    });

    let client = client_for(healthy.base_url(), failing.base_url());
    assert!(client.check_agent_status(client.doctor_agent_url()).await);
    assert!(!client.check_agent_status(client.booking_agent_url()).await);
}

#[tokio::test]
async fn test_agent_endpoint_report() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200);
    });
    let root = server.mock(|when, then| {
        when.method(POST)
            .path("/")
            .json_body(json!({"message": "test connection"}));
        then.status(404);
    });

    let client = client_for(server.base_url(), closed_url());
    let report = client.test_agent_endpoints(client.doctor_agent_url()).await;

    root.assert();
    assert_eq!(report["/health"].status, Some(200));
    assert!(report["/health"].available);
    assert_eq!(report["/"].status, Some(404));
    assert!(!report["/"].available);

    let offline = client.test_agent_endpoints(client.booking_agent_url()).await;
    assert_eq!(offline["/health"].status, None);
    assert!(offline["/health"].error.is_some());
}
