//! CLI output formatting.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Digits kept on each side when a result is abbreviated.
const PREVIEW_DIGITS: usize = 50;

/// Format a rendered value for display, abbreviating long values unless `verbose`.
#[must_use]
pub fn format_result(value: &str, verbose: bool) -> String {
    let Some((integer, fraction)) = value.split_once('.') else {
        return value.to_string();
    };
    if verbose || fraction.len() <= 2 * PREVIEW_DIGITS {
        return value.to_string();
    }
    format!(
        "{integer}.{}...{} ({} digits)",
        &fraction[..PREVIEW_DIGITS],
        &fraction[fraction.len() - PREVIEW_DIGITS..],
        format_number(fraction.len() as u64)
    )
}

/// Format a duration for display.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 0.001 {
        format!("{:.2}µs", secs * 1_000_000.0)
    } else if secs < 1.0 {
        format!("{:.2}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.3}s")
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:.1}s")
    }
}

/// Format a number with thousand separators.
#[must_use]
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Write the rendered value to a file, followed by a newline.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written.
pub fn write_to_file(path: &Path, value: &str) -> io::Result<()> {
    let mut file = io::BufWriter::new(fs::File::create(path)?);
    writeln!(file, "{value}")?;
    file.flush()
}
