use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
}

/// Credentials accepted by `POST /token`. Unset values match nothing.
#[derive(Debug, Clone, Default)]
pub struct AdminCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AdminCredentials {
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username.as_deref() == Some(username) && self.password.as_deref() == Some(password)
    }

    pub fn accepts_token(&self, token: &str) -> bool {
        self.username.as_deref() == Some(token)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Without a database URL the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub admin: AdminCredentials,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 8080,
        };

        Ok(Config {
            host: non_empty("HOST").unwrap_or_else(|| "localhost".to_string()),
            port,
            database_url: non_empty("DATABASE_URL"),
            admin: AdminCredentials {
                username: non_empty("ADMIN_USERNAME"),
                password: non_empty("ADMIN_PASSWORD"),
            },
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.address(), "localhost:8080");
        assert!(config.database_url.is_none());
        assert!(!config.admin.matches("", ""));
    }

    #[test]
    fn reads_everything_from_the_environment() {
        let config = config(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("DATABASE_URL", "postgres://localhost/rsvp"),
            ("ADMIN_USERNAME", "admin"),
            ("ADMIN_PASSWORD", "hunter2"),
        ])
        .unwrap();

        assert_eq!(config.address(), "0.0.0.0:9000");
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/rsvp"));
        assert!(config.admin.matches("admin", "hunter2"));
        assert!(!config.admin.matches("admin", "wrong"));
        assert!(config.admin.accepts_token("admin"));
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidPort(_))
        ));
    }
}
