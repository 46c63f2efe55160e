//! mergebot - automatic pull request merge bot

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use cli::{CommandContext, MergeOptions, ProcessCliOptions};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mergebot")]
#[command(about = "Automatic pull request merge bot")]
#[command(version)]
struct Cli {
    /// Repository as owner/name (defaults to $GITHUB_REPOSITORY)
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// GitHub Enterprise host
    #[arg(long, global = true)]
    host: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one pull request and print its decision
    Show {
        /// Pull request number
        number: u64,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the ranked merge queue of a base branch
    Queue {
        /// Base branch
        branch: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Publish the approval status check of a pull request
    Status {
        /// Pull request number
        number: u64,
    },

    /// Merge a pull request (rebase, falling back to a merge commit)
    Merge {
        /// Pull request number
        number: u64,

        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,

        /// Merge even if the pull request is not approved
        #[arg(long)]
        force: bool,
    },

    /// Run one decision cycle on a base branch
    Process {
        /// Base branch
        branch: String,

        /// Decide without merging, updating branches or publishing statuses
        #[arg(long)]
        dry_run: bool,

        /// Print the queue as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "mergebot=info",
        1 => "mergebot=debug",
        _ => "mergebot=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            on_signal.cancel();
        }
    });

    let ctx = CommandContext::new(
        cli.repo.as_deref(),
        cli.config.as_deref(),
        cli.host.as_deref(),
        cancel,
    )
    .await?;

    match cli.command {
        Commands::Show { number, json } => cli::run_show(&ctx, number, json).await?,
        Commands::Queue { branch, json } => cli::run_queue(&ctx, &branch, json).await?,
        Commands::Status { number } => cli::run_status(&ctx, number).await?,
        Commands::Merge { number, yes, force } => {
            cli::run_merge(&ctx, number, MergeOptions { yes, force }).await?;
        }
        Commands::Process {
            branch,
            dry_run,
            json,
        } => cli::run_process(&ctx, &branch, ProcessCliOptions { dry_run, json }).await?,
    }

    Ok(())
}
