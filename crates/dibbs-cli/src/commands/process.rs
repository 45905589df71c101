//! Process command - run the batch driver over the inbox.

use super::{load_config, one_line};
use anyhow::{Context, Result};
use colored::Colorize;
use dibbs_extract::{BatchReport, FileStatus, Processor};
use indicatif::{ProgressBar, ProgressStyle};

pub fn run(input: Option<String>, dry_run: bool, no_move: bool) -> Result<()> {
    let config = load_config()?;

    let mut processor = Processor::new(&config)
        .context("Invalid qualification settings")?
        .dry_run(dry_run);
    if let Some(input) = input {
        processor = processor.with_inbox(input);
    }
    if no_move {
        processor = processor.move_files(false);
    }

    let inbox = processor.inbox();
    let files = processor
        .pending_pdfs()
        .with_context(|| format!("Cannot read inbox {}", inbox.display()))?;

    println!("{} {}", "Inbox:".cyan(), inbox.display());
    if files.is_empty() {
        println!("{}", "No PDF files found to process.".yellow());
        return Ok(());
    }
    println!("Found {} PDFs", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut started = false;
    let report = processor.process_paths_with(&files, |path| {
        if started {
            pb.inc(1);
        }
        started = true;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        pb.set_message(name);
    })?;
    pb.inc(1);
    pb.finish_and_clear();

    print_report(&report);
    Ok(())
}

fn print_report(report: &BatchReport) {
    for file in &report.files {
        match file.status {
            FileStatus::Qualified => {
                println!("{} {}", "✓".green(), file.file_name);
                if let Some(dest) = &file.destination {
                    println!("    {} {}", "→".dimmed(), dest.display());
                }
            }
            FileStatus::Skipped => {
                println!("{} {}", "⊘".yellow(), file.file_name);
                for reason in &file.reasons {
                    println!("    {}", one_line(reason, 100).dimmed());
                }
            }
            FileStatus::Duplicate => {
                println!("{} {} (duplicate)", "=".dimmed(), file.file_name);
            }
        }
    }
    for failure in &report.failures {
        println!("{} {}", "✗".red(), failure.file_name);
        println!("    {}", failure.error.dimmed());
    }

    let summary = report.summary();
    println!();
    println!("{} {}", "Qualified:".green().bold(), summary.qualified);
    println!("{} {}", "Skipped:".yellow().bold(), summary.skipped);
    if summary.duplicates > 0 {
        println!("{} {}", "Duplicates:".dimmed(), summary.duplicates);
    }
    if summary.errors > 0 {
        println!("{} {}", "Failed:".red().bold(), summary.errors);
    }

    if report.dry_run {
        println!("\n{}", "Dry run - nothing was written or moved.".cyan());
        return;
    }
    if let Some(path) = &report.summary_file {
        println!("\nSummary: {}", path.display());
    }
    if let Some(path) = &report.crm_export_file {
        println!("CRM import: {}", path.display());
    }
}
