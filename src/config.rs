use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "RESERVE";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Number of `DbActor` threads on the sync arbiter.
    pub db_workers: usize,
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
    /// SQL script executed once at startup, after migrations.
    #[serde(default)]
    pub seed_file: Option<String>,
}

impl Settings {
    /// Defaults, then an optional `Settings.*` file in the working directory,
    /// then `RESERVE_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(Environment::with_prefix(ENV_PREFIX))
    }

    pub fn build(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_url", "reservation.db")?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8000)?
            .set_default("db_workers", 4)?
            .set_default("pool_size", 8)?
            .set_default("busy_timeout_ms", 5000)?
            .add_source(File::with_name("Settings").required(false))
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
