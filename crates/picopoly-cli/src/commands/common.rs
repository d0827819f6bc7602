//! Shared CLI helpers used across multiple commands.

use picopoly_config::{SynthConfig, default_config_path};
use std::path::Path;

/// Load the configuration.
///
/// Searches in this order:
/// 1. The file given with `--config`
/// 2. The user configuration file, if it exists
/// 3. Built-in defaults
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SynthConfig> {
    if let Some(path) = path {
        return SynthConfig::load(path)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        tracing::info!(path = %default_path.display(), "using user configuration");
        return SynthConfig::load(&default_path)
            .map_err(|e| anyhow::anyhow!("{}: {}", default_path.display(), e));
    }

    Ok(SynthConfig::default())
}
