//! Driftsync CLI - drift command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod logging;
mod util;

/// Driftsync - keep a remote code index in step with your working tree
#[derive(Parser)]
#[command(name = "drift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (DRIFT_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Configuration file (default: platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload the repository and keep uploading changes until Ctrl-C
    Link {
        /// Space id to link into (optional when only one space exists)
        #[arg(long)]
        space: Option<String>,

        /// Directory to watch (default: current directory)
        #[arg(long, value_name = "DIR")]
        path: Option<PathBuf>,

        /// Quiet period before changes are uploaded
        #[arg(long, value_name = "MS")]
        quiet_period_ms: Option<u64>,
    },
    /// List the files an initial upload would send
    Scan {
        /// Directory to scan (default: current directory)
        #[arg(long, value_name = "DIR")]
        path: Option<PathBuf>,
    },
    /// List the spaces available to your token
    Spaces,
    /// Store an access token
    Login {
        #[arg(long)]
        token: String,
    },
    /// Remove the stored access token
    Logout,
    /// Show the effective configuration
    Config {
        /// Print the configuration file location only
        #[arg(long, conflicts_with = "example")]
        path: bool,

        /// Print a default configuration file
        #[arg(long)]
        example: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose, cli.log_file.as_deref())?;
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Link {
            space,
            path,
            quiet_period_ms,
        } => cmd::link::run(config_path, space, path, quiet_period_ms).await,
        Commands::Scan { path } => cmd::scan::run(config_path, path).await,
        Commands::Spaces => cmd::spaces::run(config_path).await,
        Commands::Login { token } => cmd::login::run(&token).await,
        Commands::Logout => cmd::logout::run().await,
        Commands::Config { path, example } => cmd::config::run(config_path, path, example).await,
    }
}
