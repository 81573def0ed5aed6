// src/config/validate.rs

use anyhow::{Result, anyhow};

use crate::config::model::Config;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - the listen port is non-zero
/// - tool binaries are non-empty
/// - `cwd_marker` is a single path component
/// - no variable is both set and cleared for the assistant
///
/// It does **not** check that the tool binaries exist or are runnable;
/// spawn failures surface inside the event stream at call time.
pub fn validate_config(cfg: &Config) -> Result<()> {
    if cfg.server.port == 0 {
        return Err(anyhow!("[server].port must be >= 1 (got 0)"));
    }

    if cfg.assistant.bin.trim().is_empty() {
        return Err(anyhow!("[assistant].bin must not be empty"));
    }

    if cfg.convert.bin.trim().is_empty() {
        return Err(anyhow!("[convert].bin must not be empty"));
    }

    if let Some(marker) = &cfg.deploy.cwd_marker {
        if marker.is_empty() || marker.contains('/') || marker.contains('\\') {
            return Err(anyhow!(
                "[deploy].cwd_marker must be a single path component (got '{marker}')"
            ));
        }
    }

    for key in &cfg.assistant.clear_env {
        if cfg.assistant.env.contains_key(key) {
            return Err(anyhow!(
                "[assistant] variable '{key}' is both set in `env` and listed in `clear_env`"
            ));
        }
    }

    Ok(())
}
