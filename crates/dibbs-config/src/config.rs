//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Header line of the DIBBs procurement history table.
pub const DEFAULT_PAYMENT_HISTORY_HEADER: &str =
    "CAGE   Contract Number      Quantity   Unit Cost    AWD Date  Surplus Material";

/// Header line of the CLIN unit/quantity table.
pub const DEFAULT_UNIT_TABLE_HEADER: &str =
    "CLIN  PR              PRLI       UI    QUANTITY          UNIT PRICE       TOTAL PRICE      . ";

/// Value that disables a qualification check.
pub const ANY: &str = "ANY";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub folders: FolderConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub qualification: QualificationConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&paths.config_file)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> ConfigResult<()> {
        for (key, value) in [
            ("qualification.iso", &self.qualification.iso),
            ("qualification.sampling", &self.qualification.sampling),
        ] {
            if !matches!(value.to_uppercase().as_str(), "YES" | "NO" | ANY) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be YES, NO or ANY (got '{}')",
                    key, value
                )));
            }
        }

        if self.extraction.payment_history_header.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "extraction.payment_history_header is empty".to_string(),
            ));
        }
        if self.extraction.unit_table_header.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "extraction.unit_table_header is empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        format!(
            r#"# Dibbs Configuration
# DLA DIBBs solicitation extraction

[folders]
# Solicitation PDFs waiting to be processed
inbox = "To Process"
# CSV summaries, CRM exports and processing reports
output = "Output"
# Qualified PDFs are filed under automation/<nsn>/<request number>/
automation = "Automation"
# Everything else lands here
reviewed = "Reviewed"

[extraction]
# Table headers must match the PDF text exactly, spacing included
payment_history_header = "{payment}"
payment_history_skip = 3
unit_table_header = "{unit}"
unit_table_skip = 1

[qualification]
# Minimum delivery lead time in days
min_delivery_days = 120
# YES, NO or ANY
iso = "NO"
sampling = "NO"
# Required inspection point, or ANY
inspection_point = "DESTINATION"
# MFR must mention one of these (case-insensitive); empty list accepts all
manufacturers = ["Parker"]

[processing]
# Move PDFs into automation/reviewed after processing
move_files = true
# Write a CRM import file for qualified solicitations
write_crm_export = true
# Skip PDFs whose content was already processed in the same batch
skip_duplicates = true

[watch]
ignore_patterns = [
    "*.tmp",
    "*.part",
    ".DS_Store",
]
poll_interval_seconds = 2

[ui]
color = true
"#,
            payment = DEFAULT_PAYMENT_HISTORY_HEADER,
            unit = DEFAULT_UNIT_TABLE_HEADER,
        )
    }
}

/// Working folders for the batch driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderConfig {
    pub inbox: String,
    pub output: String,
    pub automation: String,
    pub reviewed: String,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            inbox: "To Process".to_string(),
            output: "Output".to_string(),
            automation: "Automation".to_string(),
            reviewed: "Reviewed".to_string(),
        }
    }
}

impl FolderConfig {
    pub fn inbox_dir(&self) -> PathBuf {
        expand(&self.inbox)
    }

    pub fn output_dir(&self) -> PathBuf {
        expand(&self.output)
    }

    pub fn automation_dir(&self) -> PathBuf {
        expand(&self.automation)
    }

    pub fn reviewed_dir(&self) -> PathBuf {
        expand(&self.reviewed)
    }

    /// Create output, automation and reviewed folders.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.output_dir())?;
        std::fs::create_dir_all(self.automation_dir())?;
        std::fs::create_dir_all(self.reviewed_dir())?;
        Ok(())
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Table lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub payment_history_header: String,
    pub payment_history_skip: usize,
    pub unit_table_header: String,
    pub unit_table_skip: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            payment_history_header: DEFAULT_PAYMENT_HISTORY_HEADER.to_string(),
            payment_history_skip: 3,
            unit_table_header: DEFAULT_UNIT_TABLE_HEADER.to_string(),
            unit_table_skip: 1,
        }
    }
}

/// Rules deciding which solicitations are worth quoting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualificationConfig {
    pub min_delivery_days: u32,
    pub iso: String,
    pub sampling: String,
    pub inspection_point: String,
    pub manufacturers: Vec<String>,
}

impl Default for QualificationConfig {
    fn default() -> Self {
        Self {
            min_delivery_days: 120,
            iso: "NO".to_string(),
            sampling: "NO".to_string(),
            inspection_point: "DESTINATION".to_string(),
            manufacturers: vec!["Parker".to_string()],
        }
    }
}

/// Batch processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub move_files: bool,
    pub write_crm_export: bool,
    pub skip_duplicates: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            move_files: true,
            write_crm_export: true,
            skip_duplicates: true,
        }
    }
}

/// Inbox watching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub ignore_patterns: Vec<String>,
    pub poll_interval_seconds: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: vec![
                "*.tmp".to_string(),
                "*.part".to_string(),
                ".DS_Store".to_string(),
            ],
            poll_interval_seconds: 2,
        }
    }
}

/// UI/Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { color: true }
    }
}
