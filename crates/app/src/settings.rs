//! Handles settings for the application. Configuration is written in
//! `settings.toml`; every key has a default so the file is optional.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    pub accounts_path: String,
    pub state_path: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub storage: Storage,
}

impl Settings {
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("storage.accounts_path", "data/accounts.json")?
            .set_default("storage.state_path", "data/assistant_state.json")?
            .add_source(File::with_name(name).required(false))
            .build()?;

        settings.try_deserialize()
    }
}
