//! Configuration commands.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use dibbs_config::Config;
use std::process::Command;

pub fn show() -> Result<()> {
    let paths = get_paths()?;

    if !paths.config_file.exists() {
        anyhow::bail!("Config file not found. Run 'dibbs init' first.");
    }

    let contents =
        std::fs::read_to_string(&paths.config_file).context("Failed to read config file")?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("{}", contents);

    Ok(())
}

pub fn edit() -> Result<()> {
    let paths = get_paths()?;

    if !paths.config_file.exists() {
        anyhow::bail!("Config file not found. Run 'dibbs init' first.");
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| {
        if cfg!(target_os = "macos") {
            "open -t".to_string()
        } else if cfg!(windows) {
            "notepad".to_string()
        } else {
            "nano".to_string()
        }
    });

    let parts: Vec<&str> = editor.split_whitespace().collect();
    let (cmd, args) = parts.split_first().context("Invalid editor command")?;

    let status = Command::new(cmd)
        .args(args)
        .arg(&paths.config_file)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with error");
    }

    // Catch typos before the next run does.
    Config::load_from(&paths.config_file).context("Edited config is invalid")?;

    println!("{} Configuration saved.", "✓".green());

    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    value
        .parse()
        .with_context(|| format!("Invalid boolean value: {}", value))
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Apply `key = value` to a config.
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["folders", "inbox"] => config.folders.inbox = value.to_string(),
        ["folders", "output"] => config.folders.output = value.to_string(),
        ["folders", "automation"] => config.folders.automation = value.to_string(),
        ["folders", "reviewed"] => config.folders.reviewed = value.to_string(),
        ["extraction", "payment_history_header"] => {
            config.extraction.payment_history_header = value.to_string()
        }
        ["extraction", "payment_history_skip"] => {
            config.extraction.payment_history_skip =
                value.parse().context("Invalid payment_history_skip value")?;
        }
        ["extraction", "unit_table_header"] => {
            config.extraction.unit_table_header = value.to_string()
        }
        ["extraction", "unit_table_skip"] => {
            config.extraction.unit_table_skip =
                value.parse().context("Invalid unit_table_skip value")?;
        }
        ["qualification", "min_delivery_days"] => {
            config.qualification.min_delivery_days =
                value.parse().context("Invalid min_delivery_days value")?;
        }
        ["qualification", "iso"] => config.qualification.iso = value.to_uppercase(),
        ["qualification", "sampling"] => config.qualification.sampling = value.to_uppercase(),
        ["qualification", "inspection_point"] => {
            config.qualification.inspection_point = value.to_uppercase()
        }
        ["qualification", "manufacturers"] => {
            config.qualification.manufacturers = parse_list(value)
        }
        ["processing", "move_files"] => config.processing.move_files = parse_bool(value)?,
        ["processing", "write_crm_export"] => {
            config.processing.write_crm_export = parse_bool(value)?
        }
        ["processing", "skip_duplicates"] => {
            config.processing.skip_duplicates = parse_bool(value)?
        }
        ["watch", "ignore_patterns"] => config.watch.ignore_patterns = parse_list(value),
        ["watch", "poll_interval_seconds"] => {
            config.watch.poll_interval_seconds =
                value.parse().context("Invalid poll_interval_seconds value")?;
        }
        ["ui", "color"] => config.ui.color = parse_bool(value)?,
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    }

    config.validate().context("Invalid value")?;
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let paths = get_paths()?;

    let mut config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    apply(&mut config, key, value)?;
    config
        .save_to(&paths.config_file)
        .context("Failed to save config")?;

    println!("{} Set {} = {}", "✓".green(), key.cyan(), value);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();
        apply(&mut config, "qualification.min_delivery_days", "90").unwrap();
        apply(&mut config, "qualification.iso", "any").unwrap();
        apply(&mut config, "qualification.manufacturers", "Parker, Moog,").unwrap();
        apply(&mut config, "processing.move_files", "false").unwrap();

        assert_eq!(config.qualification.min_delivery_days, 90);
        assert_eq!(config.qualification.iso, "ANY");
        assert_eq!(config.qualification.manufacturers, vec!["Parker", "Moog"]);
        assert!(!config.processing.move_files);
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply(&mut config, "nope.key", "1").is_err());
        assert!(apply(&mut config, "qualification.min_delivery_days", "soon").is_err());
        assert!(apply(&mut config, "qualification.sampling", "maybe").is_err());
        assert!(apply(&mut config, "ui.color", "yes").is_err());
    }
}
