use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_database_name")]
    pub name: String,
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

/// Which document store the API runs against. `memory` keeps everything in
/// process and loses it on restart.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongodb,
    Memory,
}

fn default_database_name() -> String {
    "indicab".to_string()
}

fn default_max_pool_size() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    3
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `INDICAB__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("INDICAB").separator("__"))
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?;

        s.try_deserialize()
    }
}
