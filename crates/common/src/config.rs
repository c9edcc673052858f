//! Application configuration.

use serde::Deserialize;
use url::Url;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Application behaviour.
    #[serde(default)]
    pub app: AppConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance, used to build absolute resource links.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Application behaviour settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Accounts registered with this email receive the administrator role.
    #[serde(default)]
    pub admin_email: Option<String>,
    /// Default number of items returned by list endpoints.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_email: None,
            page_size: default_page_size(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_page_size() -> u64 {
    20
}

impl ServerConfig {
    /// Base URL of the JSON API, without a trailing slash.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        format!("{}/api/v1", self.url.trim_end_matches('/'))
    }

    /// Validate that the public URL is absolute.
    pub fn validate_url(&self) -> Result<Url, config::ConfigError> {
        Url::parse(&self.url)
            .map_err(|e| config::ConfigError::Message(format!("invalid server.url: {e}")))
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `QUILL_ENV`)
    /// 4. Environment variables with `QUILL__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();
        let env = std::env::var("QUILL_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("QUILL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.server.validate_url()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    #[cfg(test)]
    pub(crate) fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_toml(
            r#"
            [server]
            url = "https://blog.example.com/"

            [database]
            url = "postgres://localhost/quill"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.app.page_size, 20);
        assert!(config.app.admin_email.is_none());
        assert_eq!(
            config.server.api_base_url(),
            "https://blog.example.com/api/v1"
        );
    }

    #[test]
    fn test_admin_email() {
        let config = Config::from_toml(
            r#"
            [server]
            url = "http://localhost:3000"

            [database]
            url = "postgres://localhost/quill"

            [app]
            admin_email = "admin@example.com"
            page_size = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.app.admin_email.as_deref(), Some("admin@example.com"));
        assert_eq!(config.app.page_size, 50);
    }

    #[test]
    fn test_relative_url_rejected() {
        let config = Config::from_toml(
            r#"
            [server]
            url = "not a url"

            [database]
            url = "postgres://localhost/quill"
            "#,
        )
        .unwrap();

        assert!(config.server.validate_url().is_err());
    }
}
