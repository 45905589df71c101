//! CLI command implementations.

pub mod config;
pub mod extract;
pub mod init;
pub mod mfr;
pub mod process;
pub mod status;
pub mod watch;

use anyhow::{Context, Result};
use dibbs_config::{AppPaths, Config};

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Load the config file (defaults if absent) and apply its UI settings.
pub fn load_config() -> Result<Config> {
    let paths = get_paths()?;
    let config = Config::load_from(&paths.config_file).context("Failed to load config")?;

    if !config.ui.color {
        colored::control::set_override(false);
    }

    Ok(config)
}

/// Trim long multi-line values for one-line display.
pub fn one_line(value: &str, max: usize) -> String {
    let flat = value.trim().replace('\n', " / ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
