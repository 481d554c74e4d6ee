// src/main.rs

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use pq_csv_render::commands;
use pq_csv_render::config::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "pq_csv_render",
    version = pq_csv_render::crate_version(),
    about = "Power-quality telemetry CSV analysis and chart rendering"
)]
struct Cli {
    /// TOML settings file; built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for PNG charts and CSV exports (overrides [output].directory).
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Per-phase current, angle, power and power factor charts plus energy consumption.
    Process {
        /// Directory of meter CSV files.
        data_dir: PathBuf,
    },
    /// Check measured apparent power against sqrt(P^2 + Q^2) and chart THD.
    Check {
        /// Directory of meter CSV files.
        data_dir: PathBuf,
    },
    /// Compare meter power against the CMS site power export.
    Cms {
        /// Directory of meter CSV files.
        data_dir: PathBuf,
        /// CMS export to compare against (overrides [reference].file).
        #[arg(long)]
        reference: Option<PathBuf>,
    },
    /// Extract every .gz file in a directory.
    Unzip {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Move <name>/<name>.csv files up into the directory and drop the emptied folders.
    Flatten {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Render a small test chart to check the plotting backend.
    RenderTest,
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn Error>> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_toml_file(path)?,
        None => Settings::default(),
    };
    let reference = match &cli.command {
        Command::Cms { reference, .. } => reference.as_deref(),
        _ => None,
    };
    settings.apply_overrides(cli.output_dir.as_deref(), reference);

    let errors = settings.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("{}", e);
        }
        return Err(format!("{} invalid setting(s)", errors.len()).into());
    }
    Ok(settings)
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(cli)?;
    match &cli.command {
        Command::Process { data_dir } => commands::process::run(data_dir, &settings),
        Command::Check { data_dir } => commands::check::run(data_dir, &settings),
        Command::Cms { data_dir, .. } => {
            commands::cms::run(data_dir, &settings.reference.file, &settings)
        }
        Command::Unzip { dir } => commands::prep::run_unzip(dir),
        Command::Flatten { dir } => commands::prep::run_flatten(dir),
        Command::RenderTest => commands::render_test::run(&settings),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

// src/main.rs
