use config::{ConfigError, Environment};
use credit_engine::PolicyConfig;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub events: EventsConfig,
    #[serde(default)]
    pub policy: PolicySource,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EventsConfig {
    pub enabled: bool,
    /// CloudEvents `source` for credit quote events
    pub source: String,
}

/// Where the credit policy comes from. Without a file the built-in
/// v1.0.0 policy is used.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PolicySource {
    pub file: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            // Server defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.workers", 4)?
            // Event defaults
            .set_default("events.enabled", true)?
            .set_default("events.source", "https://okra.ocn.ai/v1")?;

        builder = builder.add_source(Environment::with_prefix("CREDIT_AGENT").separator("__"));

        if let Ok(port) = env::var("SERVICE_PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn load_policy(&self) -> credit_engine::Result<PolicyConfig> {
        match &self.policy.file {
            Some(path) => PolicyConfig::from_file(path),
            None => Ok(PolicyConfig::default()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                workers: 4,
            },
            events: EventsConfig {
                enabled: true,
                source: "https://okra.ocn.ai/v1".to_string(),
            },
            policy: PolicySource::default(),
        }
    }
}
