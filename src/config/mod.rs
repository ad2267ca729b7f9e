use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Firebase project id; doubles as the expected token audience.
    pub firebase_project_id: String,
    pub jwks_url: String,
    /// Clock skew tolerated when checking `exp`/`iat`.
    pub leeway_seconds: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("database.url", "sqlite://noticeboard.db")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.firebase_project_id", "")?
            .set_default("auth.jwks_url", DEFAULT_JWKS_URL)?
            .set_default("auth.leeway_seconds", 60)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with NOTICEBOARD__ prefix, double underscore separates levels)
            .add_source(
                Environment::with_prefix("NOTICEBOARD")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )

            .build()?;

        config.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                cors_origins: Vec::new(),
            },
            database: DatabaseConfig {
                url: "sqlite://noticeboard.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                firebase_project_id: String::new(),
                jwks_url: DEFAULT_JWKS_URL.to_string(),
                leeway_seconds: 60,
            },
        }
    }
}
