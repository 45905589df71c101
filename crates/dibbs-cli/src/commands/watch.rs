//! Watch command implementation.

use super::{load_config, one_line};
use anyhow::{Context, Result};
use colored::Colorize;
use dibbs_extract::{FileStatus, InboxWatcher, InboxWatcherConfig, Processor, WatchEvent};
use std::time::Duration;
use tracing::{error, info};

/// Watch the inbox and process each PDF as it lands.
pub fn run() -> Result<()> {
    let config = load_config()?;
    let processor = Processor::new(&config).context("Invalid qualification settings")?;

    let watcher_config = InboxWatcherConfig::from_config(&config.folders, &config.watch);
    let mut watcher = InboxWatcher::new(watcher_config)?;
    watcher
        .start()
        .with_context(|| format!("Cannot watch {}", watcher.inbox().display()))?;

    println!("{}", "Starting inbox watcher...".cyan());
    println!("  {} {}", "+".green(), watcher.inbox().display());
    println!("\nPress Ctrl+C to stop.\n");

    loop {
        std::thread::sleep(Duration::from_millis(100));

        for event in watcher.poll() {
            match event {
                WatchEvent::PdfArrived(path) => {
                    info!("PDF arrived: {:?}", path);
                    println!("{} {}", "New PDF:".green(), path.display());

                    match processor.process_file(&path) {
                        Ok(outcome) => match outcome.status {
                            FileStatus::Qualified => println!("  {}", "Qualified".green()),
                            FileStatus::Skipped => println!(
                                "  {} {}",
                                "Skipped:".yellow(),
                                one_line(&outcome.reasons.join("; "), 100)
                            ),
                            FileStatus::Duplicate => println!("  {}", "Duplicate".dimmed()),
                        },
                        Err(e) => {
                            error!("Failed to process {:?}: {}", path, e);
                            println!("  {} {}", "Error:".red(), e);
                        }
                    }
                }
                WatchEvent::Error(msg) => {
                    error!("Watch error: {}", msg);
                    println!("{} {}", "Watch error:".red(), msg);
                }
            }
        }
    }
}
