//! Server settings loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Configuration values controlling the HTTP server and persistence wiring.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BACKEND")]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL; when absent the in-memory store is used.
    pub database_url: Option<String>,
}

impl ServerSettings {
    /// Return the configured bind address, falling back to the default.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Return the configured database URL, if any.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_fall_back_to_defaults() {
        let settings = ServerSettings {
            bind_addr: None,
            database_url: None,
        };
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert!(settings.database_url().is_none());
    }

    #[test]
    fn configured_values_win() {
        let settings = ServerSettings {
            bind_addr: Some("127.0.0.1:9000".into()),
            database_url: Some("postgres://localhost/demo".into()),
        };
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000");
        assert_eq!(settings.database_url(), Some("postgres://localhost/demo"));
    }
}
