use std::net::SocketAddr;

use anyhow::Context;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub quiz: QuizSettings,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: SecretString,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct QuizSettings {
    /// Pick a random remaining question instead of the lowest id.
    pub randomize: bool,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 5000)?
        .set_default("database.url", "sqlite:trivia.db")?
        .set_default("quiz.randomize", false)
}

/// Reads defaults, then an optional `configuration.*` file, then `TRIVIA_*` env variables.
///
/// Nested keys use a double underscore, e.g. `TRIVIA_DATABASE__URL`.
pub fn get_configuration() -> anyhow::Result<Settings> {
    dotenv::dotenv().ok();
    let settings = defaults()?
        .add_source(File::with_name("configuration").required(false))
        .add_source(
            Environment::with_prefix("TRIVIA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read configuration")?;
    settings
        .try_deserialize::<Settings>()
        .context("Invalid configuration")
}
