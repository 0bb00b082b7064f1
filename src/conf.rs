use config::{Config, ConfigError, Environment};
use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Deserialize, Debug)]
pub struct Settings {
    pub service_name: String,
    pub listen_port: String,
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub database_pool_max_connections: u32,
    //client
    pub api_url: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let conf = Config::builder()
            .set_default("service_name", "jobtracker")?
            .set_default("listen_port", "3000")?
            .set_default("store", "postgres")?
            .set_default("database_pool_max_connections", 5)?
            .set_default("api_url", "http://localhost:3000")?
            .add_source(Environment::default())
            .build()?;
        let mut s: Settings = conf.try_deserialize()?;
        if s.database_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            s.database_url = None;
        }
        Ok(s)
    }
}

lazy_static! {
    pub static ref settings: Settings = Settings::new().expect("improperly configured");
}
