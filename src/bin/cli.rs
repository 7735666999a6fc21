use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use status_board::config::DEFAULT_CONFIG_FILE;
use status_board::persistence::report_path;
use status_board::{
    Config, generate_reports, load_projects, render_deck, save_projects_to_csv,
    save_projects_to_json,
};

/// Per-person status reports from a folder of project files
#[derive(Parser)]
#[command(name = "cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding projects/ and people/
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to status-board.toml under the root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh workdays and rewrite every person report (default)
    Run,

    /// Render people/<OWNER>.md into a single-slide deck
    Slides {
        /// Report owner
        owner: String,
    },

    /// Dump the loaded project index
    Export {
        #[arg(value_enum)]
        format: ExportFormat,

        /// Output file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(|| cli.root.join(DEFAULT_CONFIG_FILE));
    let config = Config::load(&config_path)
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;
    let today = Local::now().date_naive();

    match cli.command {
        None | Some(Commands::Run) => {
            let summary = generate_reports(&cli.root, &config, today).with_context(|| {
                format!(
                    "cannot read project directory {}",
                    config.paths.projects_dir(&cli.root).display()
                )
            })?;
            println!("{}", summary.to_cli_summary());
        }
        Some(Commands::Slides { owner }) => {
            let report = report_path(&config.paths.people_dir(&cli.root), &owner);
            let deck = render_deck(&report, &config.presentation, today)
                .with_context(|| format!("cannot build slides for {owner}"))?;
            println!("{}", deck.slide.display());
            if let Some(image) = deck.image {
                println!("{}", image.display());
            }
        }
        Some(Commands::Export { format, path }) => {
            let projects_dir = config.paths.projects_dir(&cli.root);
            let outcome = load_projects(&projects_dir, &config.calendar()).with_context(|| {
                format!("cannot read project directory {}", projects_dir.display())
            })?;
            match format {
                ExportFormat::Csv => save_projects_to_csv(&outcome.projects, &path),
                ExportFormat::Json => save_projects_to_json(&outcome.projects, &path),
            }
            .with_context(|| format!("cannot write {}", path.display()))?;
            println!("exported {} projects to {}", outcome.projects.len(), path.display());
        }
    }

    Ok(())
}
