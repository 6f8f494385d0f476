use std::env;

use auth::ConfigurationError;
use auth::IdGenerator;
use auth::TokenConfig;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub id: IdConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Upper bound on draining in-flight requests at shutdown.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_shutdown_timeout_secs() -> u64 {
    10
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub identity_key: String,
    pub expiration_secs: i64,
}

#[derive(Deserialize, Clone)]
pub struct IdConfig {
    pub salt: String,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, ID__SALT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    /// Build the token configuration.
    ///
    /// # Errors
    /// * `MissingSigningKey`, `MissingIdentityKey`, `InvalidLifetime`
    pub fn token_config(&self) -> Result<TokenConfig, ConfigurationError> {
        let lifetime = chrono::Duration::try_seconds(self.jwt.expiration_secs)
            .ok_or(ConfigurationError::InvalidLifetime(self.jwt.expiration_secs))?;

        TokenConfig::new(
            self.jwt.secret.as_bytes(),
            self.jwt.identity_key.as_str(),
            lifetime,
        )
    }

    /// Build the public identifier generator.
    ///
    /// # Errors
    /// * `MissingSalt` - No salt configured
    pub fn id_generator(&self) -> Result<IdGenerator, ConfigurationError> {
        IdGenerator::new(self.id.salt.as_bytes())
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("identity_key", &self.identity_key)
            .field("expiration_secs", &self.expiration_secs)
            .finish()
    }
}

impl std::fmt::Debug for IdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdConfig")
            .field("salt", &"<redacted>")
            .finish()
    }
}
