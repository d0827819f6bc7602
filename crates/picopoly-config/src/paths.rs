//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/picopoly/picopoly.toml`
//! - macOS: `~/Library/Application Support/picopoly/picopoly.toml`
//! - Windows: `%APPDATA%\picopoly\picopoly.toml`

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Application name used for directory paths.
const APP_NAME: &str = "picopoly";

/// File name of the default configuration.
pub const CONFIG_FILE_NAME: &str = "picopoly.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the default configuration file.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE_NAME)
}

/// Create the user configuration directory if it does not exist.
pub fn ensure_user_config_dir() -> Result<PathBuf> {
    let dir = user_config_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_inside_config_dir() {
        let path = default_config_path();
        assert!(path.starts_with(user_config_dir()));
        assert!(path.ends_with(CONFIG_FILE_NAME));
        assert!(user_config_dir().ends_with(APP_NAME));
    }
}
