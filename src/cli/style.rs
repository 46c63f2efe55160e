//! Terminal styling helpers

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;

/// Check mark for completed steps
pub const CHECK: &str = "✓";

/// Cross for failed steps
pub const CROSS: &str = "✗";

/// Color helpers that respect terminal capabilities
pub trait Stylize {
    /// Dimmed secondary text
    fn muted(&self) -> String;
    /// Bold highlight
    fn emphasis(&self) -> String;
    /// Green text
    fn good(&self) -> String;
    /// Red text
    fn bad(&self) -> String;
}

impl<T: Display> Stylize for T {
    fn muted(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    }

    fn emphasis(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.bold())
            .to_string()
    }

    fn good(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.green())
            .to_string()
    }

    fn bad(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.red())
            .to_string()
    }
}

/// Green check mark
pub fn check() -> String {
    CHECK.good()
}

/// Red cross
pub fn cross() -> String {
    CROSS.bad()
}

/// Style for waiting spinners
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Color a priority score by eligibility
pub fn score(score: i32) -> String {
    let text = format!("{score:>3}");
    if score < 0 { text.muted() } else { text.good() }
}
