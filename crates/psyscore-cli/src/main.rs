//! psyscore CLI: render psychometric score exports as reports.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "psyscore", version, about = "Psychometric score export reader")]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a report from an export archive
    Report {
        /// Path to the exported .zip archive
        #[arg(long)]
        input: PathBuf,

        /// Output format: text, html, json (default from config)
        #[arg(long)]
        format: Option<String>,

        /// Write the report to this file instead of stdout
        #[arg(long, conflicts_with = "save")]
        output: Option<PathBuf>,

        /// Write the report into the configured output directory
        #[arg(long)]
        save: bool,

        /// Report heading (overrides config)
        #[arg(long)]
        title: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the scores in an export archive
    Show {
        /// Path to the exported .zip archive
        #[arg(long)]
        input: PathBuf,

        /// Show only the index or subtest matching this name prefix
        #[arg(long)]
        name: Option<String>,

        /// Confidence level for the index table: 90 or 95
        #[arg(long, default_value = "95")]
        level: String,
    },

    /// Create a starter config file
    Init,
}

fn main() {
    let cli = Cli::parse();

    let default_directive = if cli.verbose {
        "psyscore=debug"
    } else {
        "psyscore=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Report {
            input,
            format,
            output,
            save,
            title,
            config,
        } => commands::report::execute(input, format, output, save, title, config),
        Commands::Show { input, name, level } => commands::show::execute(input, name, level),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
