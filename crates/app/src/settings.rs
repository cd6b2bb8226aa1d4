//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `SPENDINGS__*` environment variables,
//! e.g. `SPENDINGS__SERVER__PORT=9000`.
//!
//! See `settings.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite(String::from("spendings.db"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: String::from("info"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
    /// Directory holding uploaded images.
    pub media_root: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: String::from("127.0.0.1"),
            port: 8000,
            database: Database::default(),
            media_root: String::from("./media"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("SPENDINGS").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
