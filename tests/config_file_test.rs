use clinic_agents::config::{self, ClientConfig, FrontendConfig, ServerConfig};
use clinic_agents::utils::validation::Validate;
use clinic_agents::RunMode;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_config_file() {
    std::env::set_var("CLINIC_TEST_AGENT_HOST", "agents.internal");
    let file = write_config(
        r#"
[doctor_agent]
host = "127.0.0.1"
port = 7998

[booking_agent]
port = 7999

[frontend]
port = 8600
doctor_agent_url = "http://${CLINIC_TEST_AGENT_HOST}:7998"
booking_agent_url = "http://${CLINIC_TEST_AGENT_HOST}:7999"

[client]
timeout_seconds = 10

[[doctors]]
id = "dr100"
name = "Dr. Ana Lima"
specialty = "Neurology"
available_slots = ["2025-06-02 10:00", "2025-06-01 09:00"]
consultation_fee = 200.0
"#,
    );

    let path = file.path().to_path_buf();
    let toml = config::load_optional(Some(&path)).unwrap().unwrap();

    let server = ServerConfig::resolve(RunMode::Both, Some(&toml), None, None, None);
    assert_eq!(server.doctor.host, "127.0.0.1");
    assert_eq!(server.doctor.port, 7998);
    assert_eq!(server.booking.port, 7999);
    assert_eq!(server.doctors.len(), 1);
    assert_eq!(server.doctors[0].id, "dr100");
    assert!(server.validate().is_ok());

    let client = ClientConfig::resolve(Some(&toml), None, None, None);
    assert_eq!(client.doctor_agent_url, "http://agents.internal:7998");
    assert_eq!(client.timeout_seconds, 10);

    let frontend = FrontendConfig::resolve(Some(&toml), None, None, client);
    assert_eq!(frontend.host, "0.0.0.0");
    assert_eq!(frontend.port, 8600);
    assert!(frontend.validate().is_ok());
}

#[test]
fn test_invalid_doctor_seed_is_rejected() {
    let file = write_config(
        r#"
[[doctors]]
id = "dr1"
name = "Dr. A"
specialty = "Cardiology"
available_slots = ["tomorrow morning"]
"#,
    );
    let path = file.path().to_path_buf();
    assert!(config::load_optional(Some(&path)).is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    let path = std::path::PathBuf::from("/nonexistent/clinic-agents.toml");
    let err = config::load_optional(Some(&path)).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(config::load_optional(None).unwrap().is_none());
}
