//! Output helpers for consistent CLI output.
//!
//! Status lines use colored prefixes; errors go to stderr, everything else to
//! stdout.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::borrow::Cow;
use std::time::Duration;

pub struct Output;

impl Output {
    /// `✓ Installed hello`
    pub fn success(msg: impl AsRef<str>) {
        println!("{} {}", "✓".green().bold(), msg.as_ref());
    }

    /// `✗ Failed to install hello` (stderr)
    pub fn error(msg: impl AsRef<str>) {
        eprintln!("{} {}", "✗".red().bold(), msg.as_ref().red());
    }

    /// `⚠ Manifest is corrupt`
    pub fn warning(msg: impl AsRef<str>) {
        println!("{} {}", "⚠".yellow(), msg.as_ref());
    }

    /// `→ Cancelled.`
    pub fn info(msg: impl AsRef<str>) {
        println!("{} {}", "→".cyan(), msg.as_ref().dimmed());
    }

    /// Indented suggestion under an error.
    pub fn hint(msg: impl AsRef<str>) {
        println!("  {} {}", "→".cyan(), msg.as_ref());
    }

    pub fn header(msg: impl AsRef<str>) {
        println!("{}", msg.as_ref().bold().cyan());
    }

    /// Aligned key/value pair.
    pub fn kv(key: impl AsRef<str>, value: impl AsRef<str>) {
        println!("  {:<14} {}", format!("{}:", key.as_ref()).cyan(), value.as_ref());
    }

    pub fn separator() {
        println!("{}", "-".repeat(50).dimmed());
    }

    /// Spinner shown until one of the `finish_*` methods is called. Hidden
    /// when stderr is not a terminal.
    pub fn spinner(msg: impl Into<Cow<'static, str>>) -> Spinner {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(msg);
        pb.enable_steady_tick(Duration::from_millis(80));
        Spinner(pb)
    }
}

pub struct Spinner(ProgressBar);

impl Spinner {
    pub fn finish_clear(self) {
        self.0.finish_and_clear();
    }
}
