//! Murmur CLI
//!
//! Command-line interface for Murmur - direct messaging over a REST API with
//! a realtime channel.

mod commands;
mod config;
mod display;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "murmur")]
#[command(version, about = "Direct messaging from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory (default: ~/.murmur)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// REST API base URL
    #[arg(
        long,
        global = true,
        env = "MURMUR_API_URL",
        default_value = murmur_core::DEFAULT_API_URL
    )]
    api_url: String,

    /// Verbose logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Your handle
        username: String,

        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show whether a session is stored
    Status,

    /// Look up a user by handle
    User {
        /// Handle, with or without a leading '@'
        handle: String,
    },

    /// List conversations
    Inbox {
        /// Maximum number of conversations
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show the conversation with a user
    Thread {
        /// Handle of the other participant
        handle: String,

        /// Older pages to load after the first one
        #[arg(long, default_value = "0")]
        older: u32,
    },

    /// Send a message
    Send {
        /// Handle of the recipient
        handle: String,

        /// Message text
        body: String,

        /// Send over HTTP instead of the realtime channel
        #[arg(long)]
        rest: bool,

        /// Seconds to wait for the realtime channel before falling back to HTTP
        #[arg(long, default_value = "10")]
        wait: u64,
    },

    /// Stream live events until interrupted
    Listen {
        /// Only show the conversation with this user
        handle: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("murmur_core=debug,murmur_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "murmur", &mut io::stdout());
        return Ok(());
    }

    // Resolve data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".murmur")
    });

    let config = CliConfig::new(data_dir, &cli.api_url)?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&config, &username, password).await?;
        }
        Commands::Logout => commands::auth::logout(&config)?,
        Commands::Status => commands::auth::status(&config),
        Commands::User { handle } => commands::inbox::user(&config, &handle).await?,
        Commands::Inbox { limit } => commands::inbox::list(&config, limit).await?,
        Commands::Thread { handle, older } => {
            commands::thread::show(&config, &handle, older).await?;
        }
        Commands::Send {
            handle,
            body,
            rest,
            wait,
        } => {
            if rest {
                commands::send::via_rest(&config, &handle, &body).await?;
            } else {
                commands::send::via_realtime(&config, &handle, &body, wait).await?;
            }
        }
        Commands::Listen { handle } => commands::listen::run(&config, handle.as_deref()).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
