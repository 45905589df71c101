//! Mfr command - split a manufacturer string into QPL entries.

use anyhow::Result;
use colored::Colorize;
use dibbs_extract::extractors::parse_mfr_string;

pub fn run(value: &str) -> Result<()> {
    let entries = parse_mfr_string(value);

    if entries.is_empty() {
        println!("{}", "No manufacturer entries found.".yellow());
        println!(
            "{}",
            "Expected: <NAME> <5-digit CAGE> P/N <PART NUMBER>".dimmed()
        );
        return Ok(());
    }

    println!(
        "{} {}",
        "Manufacturer entries:".cyan().bold(),
        entries.len()
    );
    for entry in &entries {
        println!(
            "  {} {}  CAGE {}  P/N {}",
            "•".dimmed(),
            entry.manufacturer_name.white().bold(),
            entry.cage_code.green(),
            entry.part_number
        );
    }

    Ok(())
}
