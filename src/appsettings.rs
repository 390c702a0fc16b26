use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct TelegramSettings {
    pub token: String,
}

#[derive(Deserialize, Debug)]
pub struct ReminderSettings {
    pub file: PathBuf,
}

#[derive(Deserialize, Debug)]
pub struct EpguideSettings {
    pub base_url: String,
}

#[derive(Deserialize, Debug)]
pub struct GameSettings {
    pub file: PathBuf,
}

#[derive(Deserialize, Debug)]
pub struct AppSettings {
    pub telegram: TelegramSettings,
    pub reminders: ReminderSettings,
    pub epguide: EpguideSettings,
    pub games: GameSettings,
}

impl AppSettings {
    /// Layers `appsettings.*`, an optional `appsettings.local.*` and
    /// `APP`-prefixed environment variables, later sources winning.
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("appsettings").required(true))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?;

        settings.try_deserialize()
    }
}
