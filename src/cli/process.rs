//! Process command - run one decision cycle on a branch

use crate::cli::context::CommandContext;
use crate::cli::style::{self, Stylize, check, cross, spinner_style};
use anstream::println;
use indicatif::ProgressBar;
use mergebot::engine::{CycleAction, CycleReport, ProcessOptions};
use mergebot::error::{Error, Result};
use std::time::Duration;

/// Options for the process command
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCliOptions {
    /// Decide without acting
    pub dry_run: bool,
    /// Print the queue as JSON
    pub json: bool,
}

/// Run the process command
pub async fn run_process(
    ctx: &CommandContext,
    branch: &str,
    options: ProcessCliOptions,
) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!("Processing {}...", branch.emphasis()));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let report = ctx
        .engine
        .process_branch(
            branch,
            ProcessOptions {
                dry_run: options.dry_run,
            },
            &ctx.cancel,
        )
        .await;
    spinner.finish_and_clear();
    let report = report?;

    if options.json {
        let text = serde_json::to_string_pretty(&report.queue)
            .map_err(|e| Error::Io(e.into()))?;
        println!("{text}");
    } else {
        print_report(&report);
    }

    match report.action {
        CycleAction::MergeFailed(failure) => Err(failure.into()),
        _ => Ok(()),
    }
}

fn print_report(report: &CycleReport) {
    for summary in &report.queue {
        println!("{} {summary}", style::score(summary.score));
    }
    if report.statuses_published > 0 {
        println!(
            "{}",
            format!("{} status check(s) updated", report.statuses_published).muted()
        );
    }

    match &report.action {
        CycleAction::NothingQueued => {
            println!("{}", format!("Nothing queued on {}.", report.branch).muted());
        }
        CycleAction::Waiting { pr, reason } => {
            println!("{}", format!("Waiting on {pr}: {reason}").muted());
        }
        CycleAction::Merged(outcome) => println!(
            "{} Merged {} with {} as {}",
            check(),
            outcome.pr,
            outcome.method.emphasis(),
            outcome.sha.muted()
        ),
        CycleAction::MergeFailed(failure) => println!("{} {failure}", cross()),
        CycleAction::BranchUpdated(pr) => println!("{} Requested branch update for {pr}", check()),
        CycleAction::WouldMerge(pr) => println!("Would merge {}", pr.emphasis()),
        CycleAction::WouldUpdateBranch(pr) => {
            println!("Would update branch of {}", pr.emphasis());
        }
    }
}
