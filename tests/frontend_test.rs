use clinic_agents::config::{ListenAddr, ServerConfig};
use clinic_agents::core::store::seed_doctors;
use clinic_agents::frontend::{self, FrontendState};
use clinic_agents::server::{start_agents, AgentSlot, RunningAgents};
use clinic_agents::{AgentClient, ClientConfig, RunMode};
use serde_json::Value;
use tokio::net::TcpListener;

struct Harness {
    agents: RunningAgents,
    url: String,
    stop: tokio::sync::oneshot::Sender<()>,
    server: tokio::task::JoinHandle<clinic_agents::Result<()>>,
}

async fn start() -> Harness {
    let local = ListenAddr {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let agents = start_agents(&ServerConfig {
        mode: RunMode::Both,
        doctor: local.clone(),
        booking: local,
        doctors: seed_doctors(),
    })
    .await
    .unwrap();

    let client = AgentClient::new(&ClientConfig {
        doctor_agent_url: format!("http://{}", agents.addr(AgentSlot::Doctor).unwrap()),
        booking_agent_url: format!("http://{}", agents.addr(AgentSlot::Booking).unwrap()),
        timeout_seconds: 5,
    })
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(frontend::serve(
        listener,
        FrontendState::new(client),
        async move {
            let _ = stopped.await;
        },
    ));

    Harness {
        agents,
        url,
        stop,
        server,
    }
}

impl Harness {
    async fn stop(self) {
        let _ = self.stop.send(());
        self.server.await.unwrap().unwrap();
        self.agents.shutdown().await.unwrap();
    }
}

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// `name=value` part of the session cookie issued by `response`.
fn session_cookie(response: &reqwest::Response) -> String {
    let set_cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(set_cookie.starts_with("clinic_session="));
    set_cookie.split(';').next().unwrap().to_string()
}

async fn page(client: &reqwest::Client, url: &str, cookie: Option<&str>) -> String {
    let mut request = client.get(format!("{}/", url));
    if let Some(cookie) = cookie {
        request = request.header("cookie", cookie);
    }
    request.send().await.unwrap().text().await.unwrap()
}

#[tokio::test]
async fn test_streamlit_style_health_endpoint() {
    let harness = start().await;
    let response = reqwest::get(format!("{}/_stcore/health", harness.url))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
    harness.stop().await;
}

#[tokio::test]
async fn test_booking_form_round_trip() {
    let harness = start().await;
    let client = no_redirect_client();

    let response = client
        .post(format!("{}/book", harness.url))
        .form(&[
            ("patient_name", "Jane Doe"),
            ("patient_phone", ""),
            ("specialty", "Dermatology"),
            ("time_preference", "Afternoon"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()["location"], "/");
    let cookie = session_cookie(&response);

    let page = page(&client, &harness.url, Some(&cookie)).await;
    assert!(page.contains(
        "book appointment for Jane Doe with Dermatology specialist in the afternoon"
    ));
    assert!(page.contains("<pre>✅ Appointment booked successfully!"));
    assert!(page.contains("Dr. Michael Chen"));
    assert!(page.contains("🟢 Online"));

    harness.stop().await;
}

#[tokio::test]
async fn test_missing_fields_warn_and_clear_empties_history() {
    let harness = start().await;
    let client = no_redirect_client();

    let response = client
        .post(format!("{}/cancel", harness.url))
        .form(&[("appointment_id", "  ")])
        .send()
        .await
        .unwrap();
    let cookie = session_cookie(&response);
    let before = page(&client, &harness.url, Some(&cookie)).await;
    assert!(before.contains("Please enter an appointment ID"));

    let cleared = client
        .post(format!("{}/clear", harness.url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert!(cleared.headers().get("set-cookie").is_none());
    let after = page(&client, &harness.url, Some(&cookie)).await;
    assert!(!after.contains("Please enter an appointment ID"));

    harness.stop().await;
}

#[tokio::test]
async fn test_visitors_do_not_see_each_other() {
    let harness = start().await;
    let client = no_redirect_client();

    let first = client
        .post(format!("{}/book", harness.url))
        .form(&[("patient_name", "Jane Doe"), ("patient_phone", "5551234567")])
        .send()
        .await
        .unwrap();
    let first_cookie = session_cookie(&first);

    let second = client
        .post(format!("{}/chat", harness.url))
        .form(&[("agent", "doctor"), ("message", "list doctors")])
        .send()
        .await
        .unwrap();
    let second_cookie = session_cookie(&second);
    assert_ne!(first_cookie, second_cookie);

    let first_page = page(&client, &harness.url, Some(&first_cookie)).await;
    assert!(first_page.contains("Jane Doe"));
    assert!(!first_page.contains("list doctors</div>"));

    let second_page = page(&client, &harness.url, Some(&second_cookie)).await;
    assert!(second_page.contains("list doctors"));
    assert!(!second_page.contains("Jane Doe"));
    assert!(!second_page.contains("5551234567"));

    let anonymous = page(&client, &harness.url, None).await;
    assert!(!anonymous.contains("Jane Doe"));

    harness.stop().await;
}

#[tokio::test]
async fn test_offline_agents_are_reported() {
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let client = AgentClient::new(&ClientConfig {
        doctor_agent_url: closed.clone(),
        booking_agent_url: closed,
        timeout_seconds: 2,
    })
    .unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(frontend::serve(
        listener,
        FrontendState::new(client),
        async move {
            let _ = stopped.await;
        },
    ));

    let http = no_redirect_client();
    let response = http
        .post(format!("{}/book", url))
        .form(&[("patient_name", "Jane Doe")])
        .send()
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let page = page(&http, &url, Some(&cookie)).await;
    assert!(page.contains("Booking Agent is offline!"));
    assert!(page.contains("class=\"entry error\""));
    assert!(page.contains("🔴 Offline"));

    let _ = stop.send(());
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_debug_reports_both_agents() {
    let harness = start().await;
    let report: Value = reqwest::get(format!("{}/debug", harness.url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    for agent in ["doctor_agent", "booking_agent"] {
        let health = &report[agent]["endpoints"]["/health"];
        assert_eq!(health["status"], 200);
        assert_eq!(health["available"], true);
        assert_eq!(report[agent]["endpoints"]["/"]["available"], true);
    }

    harness.stop().await;
}
