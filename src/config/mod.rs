use std::string::ToString;

use config::{Config, ConfigError};
use once_cell::sync::Lazy;
use rocket::serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct DbConfig {
    pub location: String,
}

/// where photo files (originals, live photos and size variants) are kept
#[derive(Deserialize, Clone)]
pub struct StorageConfig {
    pub root: String,
}

#[derive(Deserialize, Clone)]
pub struct LogConfig {
    /// one of `error`, `warn`, `info`, `debug`, `trace`
    pub level: String,
    /// if present, logs are written to this file in addition to stdout
    pub file: Option<String>,
}

/// config properties for the whole of this application
#[derive(Deserialize, Clone)]
pub struct PhotoServerConfig {
    pub database: DbConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

/// Parses the config file located at ./PhotoServer.toml, if it exists.
/// If this fails to parse the file, the application will panic
pub fn parse_config() -> PhotoServerConfig {
    let builder = Config::builder()
        .add_source(config::File::with_name("./PhotoServer.toml"))
        .build();
    let settings = match builder {
        Ok(settings) => settings,
        // some errors are fine, such as not found
        Err(ConfigError::Foreign(e)) if e.to_string().contains("not found") => {
            log::warn!("No config file found. Continuing startup...");
            return PS_CONFIG_DEFAULT.clone();
        }
        // basically everything else is unrecoverable, though
        Err(e) => {
            log::error!("Failed to parse config file. Exception is {e}");
            panic!("Failed to parse config file. Exception is {e}");
        }
    };
    settings.try_deserialize().unwrap_or_else(|e| {
        log::warn!("Config file is incomplete ({e}), falling back to defaults");
        PS_CONFIG_DEFAULT.clone()
    })
}

/// global variable for config, that way it doesn't need to be repeatedly parsed
pub static PHOTO_SERVER_CONFIG: Lazy<PhotoServerConfig> = Lazy::new(parse_config);
static PS_CONFIG_DEFAULT: Lazy<PhotoServerConfig> = Lazy::new(|| PhotoServerConfig {
    database: DbConfig {
        location: "./db.sqlite".to_string(),
    },
    storage: StorageConfig {
        root: "./photos".to_string(),
    },
    log: LogConfig {
        level: "info".to_string(),
        file: None,
    },
});
