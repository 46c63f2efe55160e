//! CLI command implementations

mod context;
mod merge;
mod process;
mod show;
pub mod style;

pub use context::CommandContext;
pub use merge::{MergeOptions, run_merge, run_status};
pub use process::{ProcessCliOptions, run_process};
pub use show::{run_queue, run_show};
