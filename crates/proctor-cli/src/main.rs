mod commands;
mod terminal;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "proctor")]
#[command(about = "Proctored timed multiple-choice assessments", long_about = None)]
struct Cli {
    /// Engine configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a proctored assessment session in this terminal
    Run {
        /// Question file (.json or .toml), or a directory with one file per role
        #[arg(short, long)]
        questions: PathBuf,
        /// Role the questions are for
        #[arg(short, long, default_value = "general")]
        role: String,
        /// Optional question category
        #[arg(long)]
        category: Option<String>,
        /// Still frame kept up to date by an external capture process
        #[arg(long)]
        camera: Option<PathBuf>,
        /// Print the session outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a question file without starting a session
    Validate {
        /// Question file or directory
        path: PathBuf,
        /// Role to resolve when `path` is a directory
        #[arg(short, long, default_value = "general")]
        role: String,
    },
    /// Frame classification service diagnostics
    Classifier {
        #[command(subcommand)]
        action: ClassifierAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ClassifierAction {
    /// Check that the classification service is reachable
    Check,
    /// Show the service's summary of the current session
    Summary,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print the configuration file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .target(env_logger::Target::Stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run {
            questions,
            role,
            category,
            camera,
            json,
        } => {
            let options = commands::run::RunOptions {
                questions,
                role,
                category,
                camera,
                json,
            };
            commands::run::run_command(config_path, options).await
        }
        Commands::Validate { path, role } => {
            commands::validate::validate_command(config_path, &path, &role).await
        }
        Commands::Classifier { action } => match action {
            ClassifierAction::Check => commands::classifier::handle_check(config_path).await,
            ClassifierAction::Summary => commands::classifier::handle_summary(config_path).await,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::handle_config_show(config_path),
            ConfigAction::Init { force } => commands::config::handle_config_init(config_path, force),
            ConfigAction::Path => commands::config::handle_config_path(config_path),
        },
    }
}
