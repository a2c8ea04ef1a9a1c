//! Offsign CLI
//!
//! Command-line client for uploads whose storage contracts and payments are
//! signed locally with the caller's key.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "offsign")]
#[command(about = "Offline-signing client for storage uploads", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Node API URL (can also be set via OFFSIGN_API_URL env var)
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new signing key pair
    Keygen,

    /// Show the configured identity
    Whoami,

    /// Start an upload session
    Upload {
        /// Content hash of the file to store
        hash: String,

        /// Storage length in days
        #[arg(short, long)]
        storage_length: Option<u32>,

        /// Let the node sign instead of this client
        #[arg(long)]
        online: bool,
    },

    /// Show the status of an upload session
    Status {
        /// Session id returned by `upload`
        session_id: String,

        /// Print the raw status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign and submit the session's contract batch
    SignBatch {
        /// Session id returned by `upload`
        session_id: String,

        /// Content hash of the upload
        hash: String,

        /// Upload timestamp printed by `upload`
        #[arg(long)]
        uts: String,
    },

    /// Sign and submit the payload the session is waiting for
    Sign {
        /// Session id returned by `upload`
        session_id: String,

        /// Content hash of the upload
        hash: String,

        /// Upload timestamp printed by `upload`
        #[arg(long)]
        uts: String,

        /// Channel amount; defaults to the sum of shard prices
        #[arg(long)]
        total_price: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "offsign=debug,offsign_lib=debug"
    } else {
        "offsign=info,offsign_lib=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let api_url = cli.api_url.as_deref();

    match cli.command {
        Commands::Keygen => {
            commands::keygen::run(cli.verbose)?;
        }
        Commands::Whoami => {
            commands::whoami::run(api_url, cli.verbose)?;
        }
        Commands::Upload {
            hash,
            storage_length,
            online,
        } => {
            commands::upload::run(api_url, &hash, storage_length, online, cli.verbose).await?;
        }
        Commands::Status { session_id, json } => {
            commands::status::run(api_url, &session_id, json, cli.verbose).await?;
        }
        Commands::SignBatch {
            session_id,
            hash,
            uts,
        } => {
            commands::sign::batch(api_url, &session_id, &hash, &uts, cli.verbose).await?;
        }
        Commands::Sign {
            session_id,
            hash,
            uts,
            total_price,
        } => {
            commands::sign::unsigned(api_url, &session_id, &hash, &uts, total_price, cli.verbose)
                .await?;
        }
    }

    Ok(())
}
