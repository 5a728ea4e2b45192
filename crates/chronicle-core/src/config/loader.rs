//! Locating and reading the config file

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::CONFIG_FILE_NAMES;
use super::types::Config;
use super::validation::validate_config;

/// Read, parse and validate a config file. `.toml` files are TOML; anything
/// else is read as YAML.
pub fn load_config(path: &Path) -> Result<Config> {
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: Config = if is_toml {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };
    validate_config(&config)?;

    info!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Search `start_dir` and its ancestors for a config file.
///
/// At each level every name is tried in the directory itself and then in
/// its `.github/` subdirectory; the nearest level wins.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    start_dir.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES.iter().find_map(|name| {
            [dir.join(name), dir.join(".github").join(name)]
                .into_iter()
                .find(|candidate| candidate.is_file())
        })
    })
}

/// Load the nearest config file, or defaults when there is none.
///
/// A config file that exists but fails to parse or validate is still an
/// error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    match find_config(dir) {
        Some(path) => load_config(&path).map(|config| (config, Some(path))),
        None => {
            debug!(dir = %dir.display(), "no config file, using defaults");
            Ok((Config::default(), None))
        }
    }
}
