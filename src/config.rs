use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind, Result};
use crate::picker::Labels;

const CONFIG_PATH_ENV_VAR: &str = "DATEPICKER_CONFIG_FILE";

pub(crate) fn find_configfile_locations() -> io::Result<Vec<PathBuf>> {
    let config_env = env::var(CONFIG_PATH_ENV_VAR).ok().map(PathBuf::from);

    let home = dirs::home_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "Unable to find home directory"))?;

    let home_config = home.join(".datepicker.toml");

    let config_xdg = dirs::config_dir()
        .unwrap_or_else(|| home.join(".config"))
        .join("datepicker")
        .join("config.toml");

    let mut locations = vec![config_xdg, home_config];

    if let Some(path) = config_env {
        locations.insert(0, path);
    }

    Ok(locations)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub prev_label: String,
    pub next_label: String,
    pub colors: bool,
    pub today_marker: Option<char>,
}

impl Default for Theme {
    fn default() -> Self {
        let labels = Labels::default();
        Theme {
            prev_label: labels.prev,
            next_label: labels.next,
            colors: true,
            today_marker: Some('*'),
        }
    }
}

impl Theme {
    pub fn labels(&self) -> Labels {
        Labels {
            prev: self.prev_label.clone(),
            next: self.next_label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub container_id: String,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            container_id: "datepicker".to_owned(),
            theme: Theme::default(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;

        if config.container_id.trim().is_empty() {
            return Err(Error::new(
                ErrorKind::Config,
                "'container_id' must not be empty",
            ));
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Config::from_toml(&content).map_err(|e| match e.kind {
            ErrorKind::Config => {
                let msg = format!("{} ({})", e.message.unwrap_or_default(), path.display());
                Error::new(ErrorKind::Config, &msg)
            }
            _ => e,
        })
    }
}

/// Loads `path` if given, otherwise the first existing file of the default
/// locations. Falls back to the default configuration if there is none.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        log::info!("Loading config from '{}'", path.display());
        return Config::from_file(path);
    }

    let locations = match find_configfile_locations() {
        Ok(locations) => locations,
        Err(e) => {
            log::warn!("{}", e);
            Vec::new()
        }
    };

    for location in locations {
        if location.is_file() {
            log::info!("Loading config from '{}'", location.display());
            return Config::from_file(&location);
        }
        log::debug!("No config at '{}'", location.display());
    }

    log::info!("No config file found, using defaults");
    Ok(Config::default())
}
