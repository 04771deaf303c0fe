mod commands;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use eventlens_core::config::expand_path;

#[derive(Parser)]
#[command(name = "eventlens")]
#[command(about = "Password-protected photo and video galleries for events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gallery server
    Serve {
        /// Config file (defaults to ~/.config/eventlens/config.toml)
        #[arg(short, long)]
        config: Option<String>,

        /// Address to listen on, overrides server.bind
        #[arg(short, long)]
        bind: Option<String>,

        /// Log as JSON lines
        #[arg(long)]
        log_json: bool,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a commented config template
    Init {
        /// Where to write it (defaults to ~/.config/eventlens/config.toml)
        #[arg(short, long)]
        path: Option<String>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the default config location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            bind,
            log_json,
        } => {
            logging::init(log_json);
            commands::serve::run(config.as_deref(), bind).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => {
                commands::config::init(path.as_deref().map(expand_path), force)
            }
            ConfigAction::Path => commands::config::path(),
        },
    }
}
