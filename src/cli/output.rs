use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::core::errors::Result;

/// Print a success message.
pub fn success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a header line.
pub fn header(msg: &str) {
    println!("\n{}", msg.bold());
}

/// Print an indented detail line.
pub fn detail(label: &str, value: &str) {
    println!("     {:<14} {}", format!("{label}:").dimmed(), value);
}

/// Start a spinner with the given message.
pub fn spinner(msg: &str) -> ProgressBar {
    let sp = ProgressBar::new_spinner();
    sp.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    sp.set_message(msg.to_string());
    sp.enable_steady_tick(Duration::from_millis(80));
    sp
}

/// Stop a spinner and print a success line in its place.
pub fn finish_spinner(sp: ProgressBar, msg: &str) {
    sp.finish_and_clear();
    success(msg);
}

/// Run `work` behind a spinner, clearing it whether or not the work succeeds.
pub fn with_spinner<T>(
    msg: &str,
    done: impl FnOnce(&T) -> String,
    work: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let sp = spinner(msg);
    match work() {
        Ok(value) => {
            finish_spinner(sp, &done(&value));
            Ok(value)
        }
        Err(e) => {
            sp.finish_and_clear();
            Err(e)
        }
    }
}
