//! Service settings, read from an optional `settings.toml` in the working
//! directory and overridden by `TRIPSPLIT__<SECTION>__<KEY>` environment
//! variables, e.g. `TRIPSPLIT__DATABASE__TYPE=mongo`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Database {
    Memory,
    Mongo {
        uri: String,
        #[serde(default = "default_database_name")]
        name: String,
    },
}

fn default_database_name() -> String {
    String::from("TripSplit")
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(Environment::with_prefix("TRIPSPLIT").separator("__")),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings = builder
            .set_default("app.level", "info")?
            .set_default("server.bind", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.type", "memory")?
            .build()?;

        settings.try_deserialize()
    }
}
