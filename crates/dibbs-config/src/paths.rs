//! Application paths management.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Where the config file lives, following platform conventions.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl AppPaths {
    /// Create paths using platform-specific directories.
    pub fn new() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("com", "dibbs", "dibbs")?;
        Some(Self::in_dir(proj_dirs.config_dir().to_path_buf()))
    }

    /// Paths rooted at an explicit config directory.
    pub fn in_dir(config_dir: PathBuf) -> Self {
        Self {
            config_file: config_dir.join("config.toml"),
            config_dir,
        }
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)
    }

    /// Check if dibbs has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}
