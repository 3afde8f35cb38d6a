//! UI helpers for CLI display. All of them write to stderr.

use console::style;

/// Check if color output is disabled via `NO_COLOR` env var.
#[must_use]
pub fn is_color_disabled() -> bool {
    std::env::var("NO_COLOR").is_ok()
}

/// Print a styled header.
pub fn print_header(text: &str) {
    if is_color_disabled() {
        eprintln!("=== {text} ===");
    } else {
        eprintln!("{}", style(format!("=== {text} ===")).bold().cyan());
    }
}

/// Print a plain status line.
pub fn print_status(text: &str) {
    if is_color_disabled() {
        eprintln!("  {text}");
    } else {
        eprintln!("  {}", style(text).dim());
    }
}

/// Print a success message.
pub fn print_success(text: &str) {
    if is_color_disabled() {
        eprintln!("[OK] {text}");
    } else {
        eprintln!("{} {text}", style("[OK]").green().bold());
    }
}

/// Print an error message.
pub fn print_error(text: &str) {
    if is_color_disabled() {
        eprintln!("[ERROR] {text}");
    } else {
        eprintln!("{} {text}", style("[ERROR]").red().bold());
    }
}
