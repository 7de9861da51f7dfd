//! Process configuration
//!
//! Resolved once at startup from environment variables (with CLI overrides)
//! and never re-read. The credential lists are comma-separated, mirroring
//! the deployment convention of the surrounding platform.

use std::env;

use thiserror::Error;

/// Environment variable names
const ENV_HOST: &str = "HOST";
const ENV_PORT: &str = "PORT";
const ENV_NAMESPACE: &str = "NAMESPACE";
const ENV_USERS: &str = "BASIC_AUTH_USERS";
const ENV_PASSWORDS: &str = "BASIC_AUTH_USER_PASSWORDS";
const ENV_CORS_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";

/// Configuration errors, all startup-fatal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is missing or empty
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// A variable is present but unparseable
    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

/// Resolved process configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen host
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Entity model namespace
    pub namespace: String,

    /// CORS allow-list; empty means permissive
    pub cors_origins: Vec<String>,

    /// Authorized usernames
    pub users: Vec<String>,

    /// Authorized passwords
    pub passwords: Vec<String>,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var(ENV_HOST).unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match env::var(ENV_PORT) {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidVar {
                    var: ENV_PORT,
                    value,
                })?,
            Err(_) => 8080,
        };

        let namespace = env::var(ENV_NAMESPACE).unwrap_or_else(|_| "iothub".to_string());

        let users = split_list(&env::var(ENV_USERS).unwrap_or_default());
        if users.is_empty() {
            return Err(ConfigError::MissingVar(ENV_USERS));
        }

        let passwords = split_list(&env::var(ENV_PASSWORDS).unwrap_or_default());
        if passwords.is_empty() {
            return Err(ConfigError::MissingVar(ENV_PASSWORDS));
        }

        let cors_origins = split_list(&env::var(ENV_CORS_ORIGINS).unwrap_or_default());

        Ok(Self {
            host,
            port,
            namespace,
            cors_origins,
            users,
            passwords,
        })
    }

    /// Listen address in `host:port` form
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Split a comma-separated variable, dropping empty entries
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
