//! Dibbs CLI - DLA DIBBs solicitation extraction

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Dibbs - Extract and triage DLA DIBBs solicitation PDFs
#[derive(Parser)]
#[command(name = "dibbs")]
#[command(author = "Lalo Morales <lalomorales22@github.com>")]
#[command(version)]
#[command(about = "Extract and triage DLA DIBBs solicitation PDFs", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Dibbs (create config and working folders)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Extract a solicitation PDF (or a folder of them) and print JSON
    Extract {
        /// PDF file or directory
        path: PathBuf,

        /// Print one JSON object per line instead of pretty output
        #[arg(long)]
        compact: bool,
    },

    /// Process every PDF in the inbox
    Process {
        /// Read PDFs from this folder instead of the configured inbox
        #[arg(short, long)]
        input: Option<String>,

        /// Extract and qualify only; write and move nothing
        #[arg(long)]
        dry_run: bool,

        /// Leave PDFs in place after processing
        #[arg(long)]
        no_move: bool,
    },

    /// Parse a manufacturer string into (name, CAGE, part number) entries
    Mfr {
        /// MFR text, e.g. "MOOG INC 94697 P/N 58532-012"
        value: String,
    },

    /// Watch the inbox and process PDFs as they arrive
    Watch,

    /// Show configured folders and pending PDFs
    Status,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Open config file in editor
    Edit,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., qualification.min_delivery_days)
        key: String,

        /// Value to set
        value: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dibbs=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dibbs=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Edit => commands::config::edit(),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
        },
        Commands::Extract { path, compact } => commands::extract::run(&path, compact),
        Commands::Process {
            input,
            dry_run,
            no_move,
        } => commands::process::run(input, dry_run, no_move),
        Commands::Mfr { value } => commands::mfr::run(&value),
        Commands::Watch => commands::watch::run(),
        Commands::Status => commands::status::run(),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
