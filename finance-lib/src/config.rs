use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use std::{env, fs};

#[derive(Deserialize)]
pub struct SSLConfig {
    pub private_key_file: PathBuf,
    pub certificate_chain_file: PathBuf,
}

/// OTLP collector to export spans to.
#[derive(Deserialize)]
pub struct TelemetryConfig {
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Deserialize)]
pub struct Config {
    pub database_url: String,
    pub signups_enabled: bool,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    pub telemetry: Option<TelemetryConfig>,
    pub ssl: Option<SSLConfig>,
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_owned()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_pool_size() -> u32 {
    10
}

impl Config {
    pub fn from_file(path: PathBuf) -> Result<Config, anyhow::Error> {
        let config = fs::read_to_string(path).context("Unable to read config file")?;
        Self::from_toml(&config)
    }

    pub fn from_toml(config: &str) -> Result<Config, anyhow::Error> {
        toml::from_str(config).context("Unable to parse config")
    }

    pub fn from_env() -> Result<Config, anyhow::Error> {
        let signups_enabled = read_env("SIGNUPS_ENABLED")?
            .parse::<bool>()
            .context("Unable to parse SIGNUPS_ENABLED value")?;
        let database_url = read_env("DATABASE_URL")?;
        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| default_bind_address());
        let request_timeout_secs = read_optional_env("REQUEST_TIMEOUT_SECS")?
            .unwrap_or_else(default_request_timeout_secs);
        let max_pool_size =
            read_optional_env("MAX_POOL_SIZE")?.unwrap_or_else(default_max_pool_size);

        let config = Config {
            database_url,
            signups_enabled,
            bind_address,
            request_timeout_secs,
            max_pool_size,
            telemetry: None,
            ssl: None,
        };
        Ok(config)
    }
}

fn read_env(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).with_context(|| format!("Unable to read env var: {}", key))
}

fn read_optional_env<T>(key: &str) -> Result<Option<T>, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Unable to parse {} value", key)),
        Err(_) => Ok(None),
    }
}
