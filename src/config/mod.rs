pub mod toml_config;

use crate::core::store::seed_doctors;
use crate::domain::model::Doctor;
use crate::domain::ports::AgentEndpoints;
use crate::server::RunMode;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::PathBuf;
use toml_config::TomlConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DOCTOR_PORT: u16 = 9998;
pub const DEFAULT_BOOKING_PORT: u16 = 9999;
pub const DEFAULT_FRONTEND_PORT: u16 = 8501;
pub const DEFAULT_DOCTOR_AGENT_URL: &str = "http://localhost:9998";
pub const DEFAULT_BOOKING_AGENT_URL: &str = "http://localhost:9999";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "clinic-agents")]
#[command(about = "Doctor directory and booking agents for the medical appointment service")]
pub struct AgentsArgs {
    /// Which agents to run
    #[arg(value_enum)]
    pub mode: RunMode,

    /// Path to TOML configuration file
    #[arg(short, long, env = "CLINIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bind address for both agents
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub doctor_port: Option<u16>,

    #[arg(long)]
    pub booking_port: Option<u16>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenAddr {
    pub host: String,
    pub port: u16,
}

/// Resolved settings for the agent servers.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub mode: RunMode,
    pub doctor: ListenAddr,
    pub booking: ListenAddr,
    pub doctors: Vec<Doctor>,
}

impl ServerConfig {
    /// Command-line values win over the file, the file over built-in defaults.
    pub fn resolve(
        mode: RunMode,
        file: Option<&TomlConfig>,
        host: Option<String>,
        doctor_port: Option<u16>,
        booking_port: Option<u16>,
    ) -> Self {
        let doctor_section = file.and_then(|f| f.doctor_agent.clone()).unwrap_or_default();
        let booking_section = file.and_then(|f| f.booking_agent.clone()).unwrap_or_default();

        let listen = |s: toml_config::ListenSection, port: Option<u16>, default_port: u16| {
            ListenAddr {
                host: host
                    .clone()
                    .or(s.host)
                    .unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: port.or(s.port).unwrap_or(default_port),
            }
        };

        Self {
            mode,
            doctor: listen(doctor_section, doctor_port, DEFAULT_DOCTOR_PORT),
            booking: listen(booking_section, booking_port, DEFAULT_BOOKING_PORT),
            doctors: file
                .and_then(|f| f.doctors.clone())
                .unwrap_or_else(seed_doctors),
        }
    }

    #[cfg(feature = "cli")]
    pub fn from_args(args: &AgentsArgs) -> Result<Self> {
        let file = load_optional(args.config.as_ref())?;
        Ok(Self::resolve(
            args.mode,
            file.as_ref(),
            args.host.clone(),
            args.doctor_port,
            args.booking_port,
        ))
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_port("doctor_agent", &self.doctor.host, self.doctor.port)?;
        validation::validate_port("booking_agent", &self.booking.host, self.booking.port)?;
        if self.mode == RunMode::Both
            && self.doctor == self.booking
            && self.doctor.port != 0
        {
            return Err(crate::utils::error::AgentError::InvalidConfigValueError {
                field: "booking_agent.port".to_string(),
                value: self.booking.port.to_string(),
                reason: "Both agents cannot listen on the same address".to_string(),
            });
        }
        Ok(())
    }
}

/// Where the frontend and CLI find the agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub doctor_agent_url: String,
    pub booking_agent_url: String,
    pub timeout_seconds: u64,
}

impl ClientConfig {
    pub fn resolve(
        file: Option<&TomlConfig>,
        doctor_agent_url: Option<String>,
        booking_agent_url: Option<String>,
        timeout_seconds: Option<u64>,
    ) -> Self {
        let frontend = file.and_then(|f| f.frontend.clone()).unwrap_or_default();
        Self {
            doctor_agent_url: doctor_agent_url
                .or(frontend.doctor_agent_url)
                .unwrap_or_else(|| DEFAULT_DOCTOR_AGENT_URL.to_string()),
            booking_agent_url: booking_agent_url
                .or(frontend.booking_agent_url)
                .unwrap_or_else(|| DEFAULT_BOOKING_AGENT_URL.to_string()),
            timeout_seconds: timeout_seconds
                .or_else(|| file.and_then(TomlConfig::client_timeout))
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::resolve(None, None, None, None)
    }
}

impl AgentEndpoints for ClientConfig {
    fn doctor_agent_url(&self) -> &str {
        &self.doctor_agent_url
    }

    fn booking_agent_url(&self) -> &str {
        &self.booking_agent_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("doctor_agent_url", &self.doctor_agent_url)?;
        validation::validate_url("booking_agent_url", &self.booking_agent_url)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 300)
    }
}

/// Resolved settings for the web frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    pub host: String,
    pub port: u16,
    pub client: ClientConfig,
}

impl FrontendConfig {
    pub fn resolve(
        file: Option<&TomlConfig>,
        host: Option<String>,
        port: Option<u16>,
        client: ClientConfig,
    ) -> Self {
        let frontend = file.and_then(|f| f.frontend.clone()).unwrap_or_default();
        Self {
            host: host
                .or(frontend.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: port.or(frontend.port).unwrap_or(DEFAULT_FRONTEND_PORT),
            client,
        }
    }
}

impl Validate for FrontendConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_port("frontend", &self.host, self.port)?;
        self.client.validate()
    }
}

/// Loads and validates the config file when one is given.
pub fn load_optional(path: Option<&PathBuf>) -> Result<Option<TomlConfig>> {
    match path {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            let config = TomlConfig::from_file(path)?;
            config.validate()?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}
