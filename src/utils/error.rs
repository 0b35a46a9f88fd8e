use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid message: {message}")]
    InvalidMessage { message: String },

    #[error("Doctor {doctor_id} not found")]
    DoctorNotFound { doctor_id: String },

    #[error("Slot {slot} not available for doctor {doctor_id}")]
    SlotUnavailable { doctor_id: String, slot: String },

    #[error("No doctors available for {specialty}")]
    NoDoctorsAvailable { specialty: String },

    #[error("No available appointments found matching your criteria")]
    NoMatchingSlot,

    #[error("Appointment {appointment_id} not found")]
    AppointmentNotFound { appointment_id: String },

    #[error("Appointment {appointment_id} is already cancelled")]
    AlreadyCancelled { appointment_id: String },

    #[error("Agent at {url} is unavailable: {reason}")]
    AgentUnavailable { url: String, reason: String },

    #[error("Server error: {message}")]
    ServerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Domain,
    Validation,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AgentError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AgentError::HttpError(_) | AgentError::AgentUnavailable { .. } => {
                ErrorCategory::Network
            }
            AgentError::ConfigValidationError { .. }
            | AgentError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            AgentError::InvalidMessage { .. } | AgentError::SerializationError(_) => {
                ErrorCategory::Validation
            }
            AgentError::DoctorNotFound { .. }
            | AgentError::SlotUnavailable { .. }
            | AgentError::NoDoctorsAvailable { .. }
            | AgentError::NoMatchingSlot
            | AgentError::AppointmentNotFound { .. }
            | AgentError::AlreadyCancelled { .. } => ErrorCategory::Domain,
            AgentError::IoError(_) | AgentError::ServerError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Domain => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Validation => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for binaries that stop on this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AgentError::HttpError(e) if e.is_connect() => {
                "Make sure the agent server is running and reachable".to_string()
            }
            AgentError::HttpError(e) if e.is_timeout() => {
                "The agent took too long to answer; retry or raise client.timeout_seconds"
                    .to_string()
            }
            AgentError::HttpError(_) => "Check the agent URL and network connectivity".to_string(),
            AgentError::AgentUnavailable { .. } => {
                "Start the agents with `clinic-agents both`".to_string()
            }
            AgentError::ConfigValidationError { field, .. }
            | AgentError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the config file or command line", field)
            }
            AgentError::InvalidMessage { .. } | AgentError::SerializationError(_) => {
                "Send a JSON body such as {\"message\": \"list doctors\"}".to_string()
            }
            AgentError::DoctorNotFound { .. } => {
                "Use 'list doctors' to see valid doctor IDs".to_string()
            }
            AgentError::SlotUnavailable { doctor_id, .. } => {
                format!("Use 'slots for {}' to see open slots", doctor_id)
            }
            AgentError::NoDoctorsAvailable { .. } | AgentError::NoMatchingSlot => {
                "Try another specialty or time preference".to_string()
            }
            AgentError::AppointmentNotFound { .. } | AgentError::AlreadyCancelled { .. } => {
                "Use 'list appointments' to check appointment IDs".to_string()
            }
            AgentError::IoError(_) => {
                "Check file permissions and that the port is free".to_string()
            }
            AgentError::ServerError { .. } => "Check the server logs for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AgentError::HttpError(e) if e.is_connect() => {
                "Connection failed. Make sure the agent server is running.".to_string()
            }
            AgentError::HttpError(e) if e.is_timeout() => "Request timed out.".to_string(),
            AgentError::HttpError(e) => format!("Unexpected error: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_low_severity() {
        let err = AgentError::DoctorNotFound {
            doctor_id: "dr999".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Domain);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.exit_code(), 0);
        assert_eq!(err.to_string(), "Doctor dr999 not found");
    }

    #[test]
    fn test_config_errors_exit_with_one() {
        let err = AgentError::InvalidConfigValueError {
            field: "frontend.doctor_agent_url".to_string(),
            value: "ftp://agents".to_string(),
            reason: "URL must use http or https".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.recovery_suggestion().contains("frontend.doctor_agent_url"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = AgentError::from(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "address in use",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
    }
}
