use crate::domain::model::Doctor;
use crate::utils::error::{AgentError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional file configuration shared by all binaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub doctor_agent: Option<ListenSection>,
    pub booking_agent: Option<ListenSection>,
    pub frontend: Option<FrontendSection>,
    pub client: Option<ClientSection>,
    /// Replaces the built-in doctor directory when present.
    pub doctors: Option<Vec<Doctor>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListenSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontendSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub doctor_agent_url: Option<String>,
    pub booking_agent_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSection {
    pub timeout_seconds: Option<u64>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AgentError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AgentError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the variable's value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        for (field, section) in [
            ("doctor_agent", &self.doctor_agent),
            ("booking_agent", &self.booking_agent),
        ] {
            if let Some(ListenSection { host, port }) = section {
                validation::validate_port(
                    field,
                    host.as_deref().unwrap_or(super::DEFAULT_HOST),
                    port.unwrap_or(0),
                )?;
            }
        }

        if let Some(frontend) = &self.frontend {
            if let Some(url) = &frontend.doctor_agent_url {
                validation::validate_url("frontend.doctor_agent_url", url)?;
            }
            if let Some(url) = &frontend.booking_agent_url {
                validation::validate_url("frontend.booking_agent_url", url)?;
            }
        }

        if let Some(timeout) = self.client.as_ref().and_then(|c| c.timeout_seconds) {
            validation::validate_range("client.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(doctors) = &self.doctors {
            validate_doctors(doctors)?;
        }

        Ok(())
    }

    pub fn client_timeout(&self) -> Option<u64> {
        self.client.as_ref().and_then(|c| c.timeout_seconds)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// Lowercase `dr` plus digits, the only shape chat messages can address.
fn doctor_id_re() -> &'static regex::Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^dr\d+$").expect("static regex pattern"))
}

fn validate_doctors(doctors: &[Doctor]) -> Result<()> {
    if doctors.is_empty() {
        return Err(AgentError::InvalidConfigValueError {
            field: "doctors".to_string(),
            value: "[]".to_string(),
            reason: "At least one doctor is required when the list is given".to_string(),
        });
    }

    let mut seen = std::collections::HashSet::new();
    for doctor in doctors {
        validation::validate_non_empty_string("doctors.id", &doctor.id)?;
        validation::validate_non_empty_string("doctors.name", &doctor.name)?;
        validation::validate_non_empty_string("doctors.specialty", &doctor.specialty)?;
        if !doctor_id_re().is_match(&doctor.id) {
            return Err(AgentError::InvalidConfigValueError {
                field: "doctors.id".to_string(),
                value: doctor.id.clone(),
                reason: "Doctor IDs must look like dr001".to_string(),
            });
        }
        if !seen.insert(doctor.id.as_str()) {
            return Err(AgentError::InvalidConfigValueError {
                field: "doctors.id".to_string(),
                value: doctor.id.clone(),
                reason: "Doctor IDs must be unique".to_string(),
            });
        }
        if doctor.consultation_fee < 0.0 {
            return Err(AgentError::InvalidConfigValueError {
                field: "doctors.consultation_fee".to_string(),
                value: doctor.consultation_fee.to_string(),
                reason: "Fee cannot be negative".to_string(),
            });
        }
        for slot in &doctor.available_slots {
            if chrono::NaiveDateTime::parse_from_str(slot, "%Y-%m-%d %H:%M").is_err() {
                return Err(AgentError::InvalidConfigValueError {
                    field: "doctors.available_slots".to_string(),
                    value: slot.clone(),
                    reason: "Slots must look like YYYY-MM-DD HH:MM".to_string(),
                });
            }
        }
    }
    Ok(())
}
