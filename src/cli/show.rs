//! Show and queue commands - evaluate without acting

use crate::cli::context::CommandContext;
use crate::cli::style::{self, Stylize, spinner_style};
use anstream::println;
use indicatif::ProgressBar;
use mergebot::error::{Error, Result};
use mergebot::pull::PullSummary;
use std::time::Duration;

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Io(e.into()))?;
    println!("{text}");
    Ok(())
}

fn print_summary(summary: &PullSummary) {
    println!("{}", summary.pretty.emphasis());
    println!("  {}", summary.title);
    println!(
        "  approvals: {} of {} required{}",
        summary.approvals.approved_count(),
        summary.required_approvals,
        if summary.approvals.changes_requested.is_empty() {
            String::new()
        } else {
            format!(
                ", changes requested by {}",
                summary
                    .approvals
                    .changes_requested
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
    );
    println!(
        "  ci: {}{}",
        summary.ci_status,
        summary
            .ci_target_url
            .as_deref()
            .map(|u| format!(" ({})", u.muted()))
            .unwrap_or_default()
    );
    println!(
        "  mergeable: {}, branch: {}",
        summary.mergeable_state, summary.branch_update_state
    );
    println!("  score: {}", style::score(summary.score));
}

/// Run the show command
pub async fn run_show(ctx: &CommandContext, pr_number: u64, json: bool) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!("Evaluating #{pr_number}..."));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let handle = ctx.engine.load(pr_number, &ctx.cancel).await;
    spinner.finish_and_clear();
    let summary = handle?.summary();

    if json {
        return print_json(&summary);
    }
    print_summary(&summary);
    Ok(())
}

/// Run the queue command
pub async fn run_queue(ctx: &CommandContext, branch: &str, json: bool) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!("Ranking pull requests on {}...", branch.emphasis()));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let queue = ctx.engine.build_queue(branch, &ctx.cancel).await;
    spinner.finish_and_clear();
    let summaries: Vec<PullSummary> = queue?.iter().map(|p| p.summary()).collect();

    if json {
        return print_json(&summaries);
    }
    if summaries.is_empty() {
        println!("{}", format!("No open pull requests on {branch}.").muted());
        return Ok(());
    }
    for summary in &summaries {
        println!("{} {summary}", style::score(summary.score));
    }
    Ok(())
}
