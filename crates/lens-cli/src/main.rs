use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use lens_core::LensError;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::context::GlobalOptions;
use commands::generate::GenerateArgs;

#[derive(Parser)]
#[command(name = "lens")]
#[command(about = "Lifestyle Lens - creative-brief generator for product marketing", long_about = None)]
struct Cli {
    /// Use DIR for config, secrets and history instead of the platform directories
    #[arg(long, global = true, value_name = "DIR")]
    home: Option<PathBuf>,

    /// Keep history in memory for this run only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate marketing concepts for a product
    Generate(GenerateArgs),
    /// Browse and manage saved projects
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// List the seasonal theme presets
    Themes,
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved projects, newest first
    List,
    /// Show one saved project
    Show {
        id: String,
        /// Print JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved project
    Delete { id: String },
    /// Generate a refined batch from a saved project
    Refine {
        id: String,
        /// How the concepts should change
        #[arg(long)]
        feedback: String,
        /// Save the refined batch as a new project
        #[arg(long)]
        save: bool,
        /// Print JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write default config.toml and a secret.json template
    Init,
    /// Print the resolved file locations
    Path,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(1);
    }
}

const LENS_TARGETS: [&str; 5] = [
    "lens_core",
    "lens_infrastructure",
    "lens_interaction",
    "lens_application",
    "lens",
];

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let default_directive = std::iter::once("warn".to_string())
        .chain(LENS_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect::<Vec<_>>()
        .join(",");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let globals = GlobalOptions {
        home: cli.home,
        ephemeral: cli.ephemeral,
    };

    match cli.command {
        Commands::Generate(args) => commands::generate::run(&globals, args).await?,
        Commands::History { action } => match action {
            HistoryAction::List => commands::history::list(&globals)?,
            HistoryAction::Show { id, json } => commands::history::show(&globals, &id, json)?,
            HistoryAction::Delete { id } => commands::history::delete(&globals, &id)?,
            HistoryAction::Refine {
                id,
                feedback,
                save,
                json,
            } => commands::history::refine(&globals, &id, &feedback, save, json).await?,
        },
        Commands::Themes => commands::themes::run(),
        Commands::Config { action } => match action {
            ConfigAction::Init => commands::config::init(&globals)?,
            ConfigAction::Path => commands::config::path(&globals).await?,
        },
    }

    Ok(())
}

/// Prints a short notice for domain errors and the full chain otherwise.
fn report(error: &anyhow::Error) {
    match error.downcast_ref::<LensError>() {
        Some(lens_error) => {
            tracing::debug!("[CLI] {}", lens_error);
            eprintln!("{}", lens_error.user_message().red());
        }
        None => eprintln!("{}", format!("Error: {error:#}").red()),
    }
}
