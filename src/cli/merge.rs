//! Merge and status commands - act on a single pull request

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, cross};
use anstream::println;
use dialoguer::Confirm;
use mergebot::error::{Error, Result};
use mergebot::publish::PublishOutcome;

/// Options for the merge command
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Skip the confirmation prompt
    pub yes: bool,
    /// Merge even when the approval gate fails
    pub force: bool,
}

/// Run the merge command
pub async fn run_merge(ctx: &CommandContext, pr_number: u64, options: MergeOptions) -> Result<()> {
    let handle = ctx.engine.load(pr_number, &ctx.cancel).await?;
    println!("{}", handle.pretty().emphasis());

    if let Err(e) = handle.ensure_approved() {
        if !options.force {
            return Err(e);
        }
        println!("{} {}", cross(), format!("{e}, merging anyway").muted());
    }

    if !options.yes {
        let proceed = Confirm::new()
            .with_prompt(format!("Merge #{pr_number}?"))
            .default(false)
            .interact()
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        if !proceed {
            println!("{}", "Aborted.".muted());
            return Ok(());
        }
    }

    let outcome = handle.merge().await?;
    println!(
        "{} Merged {} with {} as {}",
        check(),
        outcome.pr,
        outcome.method.emphasis(),
        outcome.sha.muted()
    );
    Ok(())
}

/// Run the status command
pub async fn run_status(ctx: &CommandContext, pr_number: u64) -> Result<()> {
    let handle = ctx.engine.load(pr_number, &ctx.cancel).await?;
    let desired = handle.desired_status();

    match handle.publish_status().await? {
        PublishOutcome::Published => println!(
            "{} {}: {} ({})",
            check(),
            ctx.engine.bot().reviewers_context(),
            desired.state,
            desired.description
        ),
        PublishOutcome::Unchanged => println!(
            "{}",
            format!(
                "{} already {} ({})",
                ctx.engine.bot().reviewers_context(),
                desired.state,
                desired.description
            )
            .muted()
        ),
    }
    Ok(())
}
