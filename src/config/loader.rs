// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::model::Config;
use crate::config::validate::validate_config;

/// Load a configuration file from a given path and return the raw `Config`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading config file at {path:?}"))?;

    let config: Config =
        toml::from_str(&contents).with_context(|| format!("parsing TOML config from {path:?}"))?;

    Ok(config)
}

/// Load a configuration file from path and run basic validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks listen-address, tool-binary, and env-override sanity.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file yields the built-in
/// defaults instead of an error. Every section has a usable default, so a
/// config file is optional.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        info!(config = %path.display(), "no config file found; using defaults");
        return Ok(Config::default());
    }
    load_and_validate(path)
}
