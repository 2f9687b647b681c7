//! # configs
//!
//! Runtime settings for Buster Block.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/{APP_ENV}.toml` (optional)
//! 4. environment variables, `APP__SECTION__KEY` (e.g. `APP__SERVER__PORT=8080`)
//!
//! A `.env` file in the working directory is loaded before the environment is read.

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthSettings {
    /// HS256 shared secret.
    #[serde(default)]
    pub jwt_secret: Option<SecretString>,
    /// RS256 public key (PEM), as published by the identity provider.
    #[serde(default)]
    pub jwt_public_key_pem: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
    pub filter: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CorsSettings {
    /// Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    pub log: LogSettings,
    #[serde(default)]
    pub cors: CorsSettings,
}

impl Settings {
    /// Loads `.env`, the config files for `APP_ENV` and the `APP__*` environment.
    pub fn load() -> Result<Self, ConfigError> {
        // Optional; a missing `.env` is not an error.
        dotenvy::dotenv().ok();
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let config = defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(config)
    }

    /// Deserializes and validates an already-built [`Config`].
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Invalid(
                "database.url is required when storage.backend = \"postgres\"".into(),
            ));
        }
        if self.auth.jwt_secret.is_none() && self.auth.jwt_public_key_pem.is_none() {
            return Err(ConfigError::Invalid(
                "one of auth.jwt_secret or auth.jwt_public_key_pem must be set".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be positive".into()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Builder pre-loaded with the built-in defaults.
pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("storage.backend", "memory")?
        .set_default("database.max_connections", 5)?
        .set_default("log.format", "pretty")?
        .set_default("log.filter", "info")?)
}
