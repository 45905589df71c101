//! Status command - show folders and pending PDFs.

use super::{get_paths, load_config};
use anyhow::Result;
use colored::Colorize;
use dibbs_extract::Processor;

pub fn run() -> Result<()> {
    let paths = get_paths()?;
    let config = load_config()?;

    println!("{}", "Dibbs Status".cyan().bold());
    println!("{}", "─".repeat(50));

    if !paths.is_initialized() {
        println!(
            "{} No config file yet; using defaults. Run 'dibbs init'.",
            "Note:".yellow().bold()
        );
    } else {
        println!("Config: {}", paths.config_file.display());
    }

    println!();
    println!("{}", "Folders".white().bold());
    for (label, dir) in [
        ("Inbox", config.folders.inbox_dir()),
        ("Output", config.folders.output_dir()),
        ("Automation", config.folders.automation_dir()),
        ("Reviewed", config.folders.reviewed_dir()),
    ] {
        if dir.exists() {
            println!("  {} {:<11} {}", "+".green(), label, dir.display());
        } else {
            println!("  {} {:<11} {} (not found)", "-".red(), label, dir.display());
        }
    }

    let q = &config.qualification;
    println!();
    println!("{}", "Qualification".white().bold());
    println!("  Min delivery days: {}", q.min_delivery_days);
    println!("  ISO: {}  Sampling: {}", q.iso, q.sampling);
    println!("  Inspection point: {}", q.inspection_point);
    if q.manufacturers.is_empty() {
        println!("  Manufacturers: any");
    } else {
        println!("  Manufacturers: {}", q.manufacturers.join(", "));
    }

    let processor = Processor::new(&config)?;
    println!();
    match processor.pending_pdfs() {
        Ok(files) if files.is_empty() => {
            println!("{}", "No PDFs waiting in the inbox.".dimmed());
        }
        Ok(files) => {
            println!("{} {}", "Pending PDFs:".white().bold(), files.len());
            for file in files.iter().take(5) {
                let name = file
                    .file_name()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                println!("  {} {}", "•".dimmed(), name);
            }
            if files.len() > 5 {
                println!("  ...and {} more", files.len() - 5);
            }
        }
        Err(e) => println!("{} {}", "Inbox unavailable:".yellow(), e),
    }

    Ok(())
}
