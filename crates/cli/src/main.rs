// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use clap::{Parser, Subcommand};
use flock_cli::commands::mutate::Change;
use flock_cli::commands::{inspect, mutate, view};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flock")]
#[command(about = "Flock CLI - inspect and change group membership views", long_about = None)]
struct Cli {
    /// Request deadline in milliseconds
    #[arg(long, global = true, default_value_t = 5000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a bootstrap file and print its content
    Inspect { file: PathBuf },
    /// Fetch the view served by a provider
    View {
        address: String,
        provider_id: u16,
        /// Print the raw view document
        #[arg(long)]
        json: bool,
    },
    /// Fetch the view through the first reachable member of a bootstrap file
    ViewFile {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Add a member to the group
    Join {
        address: String,
        provider_id: u16,
        /// Address of the member to add
        #[arg(long)]
        member_address: String,
        /// Provider id of the member to add
        #[arg(long)]
        member_id: u16,
    },
    /// Remove a member from the group
    Leave {
        address: String,
        provider_id: u16,
        #[arg(long)]
        member_address: String,
        #[arg(long)]
        member_id: u16,
    },
    /// Set a metadata entry
    SetMeta {
        address: String,
        provider_id: u16,
        key: String,
        value: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let timeout_ms = cli.timeout_ms;

    match cli.command {
        Commands::Inspect { file } => inspect::run(&file),
        Commands::View {
            address,
            provider_id,
            json,
        } => view::run(&address, provider_id, timeout_ms, json).await,
        Commands::ViewFile { file, json } => view::run_from_file(&file, timeout_ms, json).await,
        Commands::Join {
            address,
            provider_id,
            member_address,
            member_id,
        } => {
            let change = Change::Join {
                address: member_address,
                provider_id: member_id,
            };
            mutate::run(&address, provider_id, change, timeout_ms).await
        }
        Commands::Leave {
            address,
            provider_id,
            member_address,
            member_id,
        } => {
            let change = Change::Leave {
                address: member_address,
                provider_id: member_id,
            };
            mutate::run(&address, provider_id, change, timeout_ms).await
        }
        Commands::SetMeta {
            address,
            provider_id,
            key,
            value,
        } => {
            let change = Change::SetMetadata { key, value };
            mutate::run(&address, provider_id, change, timeout_ms).await
        }
    }
}
