//! Initialize Dibbs.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use dibbs_config::Config;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    if paths.is_initialized() {
        println!("{} Dibbs is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        return Ok(());
    }

    println!("{}", "Initializing Dibbs...".cyan().bold());

    paths
        .ensure_dirs()
        .context("Failed to create directories")?;

    Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    let config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    let inbox = config.folders.inbox_dir();
    std::fs::create_dir_all(&inbox).context("Failed to create inbox folder")?;
    config
        .folders
        .ensure_dirs()
        .context("Failed to create working folders")?;

    for (label, dir) in [
        ("Inbox", inbox),
        ("Output", config.folders.output_dir()),
        ("Automation", config.folders.automation_dir()),
        ("Reviewed", config.folders.reviewed_dir()),
    ] {
        println!("  {} {}: {}", "✓".green(), label, dir.display());
    }

    println!();
    println!("{}", "Dibbs initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit config: {}", "dibbs config edit".cyan());
    println!("  2. Drop solicitation PDFs into the inbox");
    println!("  3. Process them: {}", "dibbs process".cyan());

    Ok(())
}
