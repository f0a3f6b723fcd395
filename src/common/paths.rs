//! Platform-appropriate configuration paths
//!
//! Uses the directories crate:
//! - Linux: `~/.config/testweaver/`
//! - macOS: `~/Library/Application Support/testweaver/`
//! - Windows: `%APPDATA%\testweaver\`

use std::path::PathBuf;

const APP_NAME: &str = "testweaver";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_is_valid() {
        let dir = config_dir();
        assert!(dir.is_some());
    }
}
