//! Extract command - print extracted records as JSON.

use super::load_config;
use anyhow::{Context, Result};
use colored::Colorize;
use dibbs_extract::{PdfFile, SolicitationExtractor};
use std::path::{Path, PathBuf};

fn collect_pdfs(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && PdfFile::is_pdf(p))
        .collect();
    files.sort();
    files
}

/// Extract one PDF or every PDF under a directory. Nothing is moved.
pub fn run(path: &Path, compact: bool) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let config = load_config()?;
    let extractor = SolicitationExtractor::new(&config.extraction);

    let files = if path.is_dir() {
        collect_pdfs(path)
    } else {
        vec![path.to_path_buf()]
    };

    if files.is_empty() {
        eprintln!("{}", "No PDF files found.".yellow());
        return Ok(());
    }

    let mut failed = 0;
    for file in &files {
        match extractor.extract_file(file) {
            Ok(solicitation) => {
                let json = if compact {
                    serde_json::to_string(&solicitation)
                } else {
                    serde_json::to_string_pretty(&solicitation)
                }
                .context("Failed to serialize record")?;
                println!("{}", json);
            }
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", "Failed:".red().bold(), file.display(), e);
            }
        }
    }

    if failed == files.len() {
        anyhow::bail!("No records could be extracted");
    }

    Ok(())
}
