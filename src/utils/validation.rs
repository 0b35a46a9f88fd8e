use crate::utils::error::{AgentError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(AgentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AgentError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(AgentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// Port 0 is allowed and asks the OS for a free port.
pub fn validate_port(field_name: &str, host: &str, port: u16) -> Result<()> {
    validate_non_empty_string(&format!("{}.host", field_name), host)?;
    format!("{}:{}", host, port)
        .parse::<std::net::SocketAddr>()
        .map(|_| ())
        .map_err(|e| AgentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{}:{}", host, port),
            reason: format!("Invalid bind address: {}", e),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AgentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AgentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("frontend.doctor_agent_url", "http://localhost:9998").is_ok());
        assert!(validate_url("frontend.doctor_agent_url", "https://agents.example.com").is_ok());
        assert!(validate_url("frontend.doctor_agent_url", "").is_err());
        assert!(validate_url("frontend.doctor_agent_url", "localhost-9998").is_err());
        assert!(validate_url("frontend.doctor_agent_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_port() {
        assert!(validate_port("doctor_agent", "0.0.0.0", 9998).is_ok());
        assert!(validate_port("doctor_agent", "127.0.0.1", 0).is_ok());
        assert!(validate_port("doctor_agent", "not a host", 9998).is_err());
        assert!(validate_port("doctor_agent", " ", 9998).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("client.timeout_seconds", 30u64, 1, 300).is_ok());
        assert!(validate_range("client.timeout_seconds", 0u64, 1, 300).is_err());
    }
}
