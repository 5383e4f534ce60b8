// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ImpressConfig, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, apply defaults and validate it.
///
/// Extra engine args are normalised here, once, on top of the default flags.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ImpressConfig> {
    let raw_config = load_from_path(&path)?;
    let config = ImpressConfig::try_from(raw_config)?;
    Ok(config)
}

/// `Impress.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Impress.toml")
}
