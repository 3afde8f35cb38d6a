//! Application configuration from CLI flags and environment.

use std::path::PathBuf;

use clap::Parser;

use picalc_core::calculator::PiError;
use picalc_core::options::Options;
use picalc_core::precision::Radix;

/// PiCalc-rs: compute pi with the Chudnovsky series and binary splitting.
#[derive(Parser, Debug)]
#[command(name = "picalc", version, about)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppConfig {
    /// Digits after the point (accepts `1000000`, `1_000_000` or `1e6`).
    #[arg(short = 'n', long, default_value = "1000", env = "PICALC_DIGITS", value_parser = parse_digits)]
    pub digits: u64,

    /// Output base: 10 or 16.
    #[arg(short, long, default_value_t = 10)]
    pub base: u32,

    /// Worker threads (0 = available parallelism, 1 = sequential).
    #[arg(short, long, default_value_t = 0, env = "PICALC_THREADS")]
    pub threads: usize,

    /// Series terms per parallel task (0 = automatic).
    #[arg(long, default_value_t = 0)]
    pub chunk_size: u64,

    /// Write the digits to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Quiet mode (only output the digits).
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output and debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Show a progress bar.
    #[arg(short, long)]
    pub progress: bool,

    /// Check the computed digits against an independent reference.
    #[arg(long)]
    pub self_test: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Library options for the configured threads and chunk size.
    #[must_use]
    pub fn options(&self) -> Options {
        Options {
            num_threads: self.threads,
            chunk_size: self.chunk_size,
        }
    }

    /// Validated output radix.
    pub fn radix(&self) -> Result<Radix, PiError> {
        Radix::from_base(self.base)
    }
}

/// Parse a digit count such as `1000`, `1_000`, `1e6` or `2.5e3`.
///
/// Zero parses; the precision planner rejects it later.
pub fn parse_digits(input: &str) -> Result<u64, String> {
    let cleaned: String = input.trim().chars().filter(|&c| c != '_').collect();
    let (mantissa, exponent) = match cleaned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (
            mantissa,
            exponent
                .parse::<u32>()
                .map_err(|_| format!("invalid exponent in '{input}'"))?,
        ),
        None => (cleaned.as_str(), 0),
    };

    let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let well_formed = !(integer.is_empty() && fraction.is_empty())
        && integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(format!("'{input}' is not a digit count"));
    }

    let mut significand = format!("{integer}{fraction}");
    let fraction_len =
        u32::try_from(fraction.len()).map_err(|_| format!("'{input}' is too long"))?;
    let scale = if exponent >= fraction_len {
        exponent - fraction_len
    } else {
        let dropped = (fraction_len - exponent) as usize;
        let kept = significand.len() - dropped;
        if significand[kept..].bytes().any(|b| b != b'0') {
            return Err(format!("'{input}' is not a whole number"));
        }
        significand.truncate(kept);
        0
    };

    let base = if significand.is_empty() {
        0
    } else {
        significand
            .parse::<u64>()
            .map_err(|_| format!("'{input}' is too large"))?
    };
    10u64
        .checked_pow(scale)
        .and_then(|factor| base.checked_mul(factor))
        .ok_or_else(|| format!("'{input}' is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_and_grouped() {
        assert_eq!(parse_digits("1000"), Ok(1000));
        assert_eq!(parse_digits("1_000_000"), Ok(1_000_000));
        assert_eq!(parse_digits(" 42 "), Ok(42));
        assert_eq!(parse_digits("0"), Ok(0));
    }

    #[test]
    fn parse_scientific() {
        assert_eq!(parse_digits("1e6"), Ok(1_000_000));
        assert_eq!(parse_digits("1E3"), Ok(1000));
        assert_eq!(parse_digits("2.5e3"), Ok(2500));
        assert_eq!(parse_digits("1.50e1"), Ok(15));
        assert_eq!(parse_digits(".5e1"), Ok(5));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(parse_digits("").is_err());
        assert!(parse_digits("abc").is_err());
        assert!(parse_digits("e5").is_err());
        assert!(parse_digits("1e").is_err());
        assert!(parse_digits("-5").is_err());
        assert!(parse_digits("1.5").is_err());
        assert!(parse_digits("2.25e1").is_err());
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(parse_digits("1e30").is_err());
        assert!(parse_digits("99999999999999999999").is_err());
    }

    #[test]
    fn defaults() {
        let config = AppConfig::try_parse_from(["picalc"]).unwrap();
        assert_eq!(config.base, 10);
        assert_eq!(config.threads, 0);
        assert!(config.output.is_none());
        assert_eq!(config.options(), Options::default());
        assert_eq!(config.radix(), Ok(Radix::Decimal));
    }

    #[test]
    fn flags_map_to_options() {
        let config = AppConfig::try_parse_from([
            "picalc", "-n", "2e3", "-b", "16", "-t", "4", "--chunk-size", "8",
        ])
        .unwrap();
        assert_eq!(config.digits, 2000);
        assert_eq!(config.radix(), Ok(Radix::Hexadecimal));
        let options = config.options();
        assert_eq!(options.num_threads, 4);
        assert_eq!(options.chunk_size, 8);
    }

    #[test]
    fn unsupported_base_is_a_config_error() {
        let config = AppConfig::try_parse_from(["picalc", "--base", "8"]).unwrap();
        assert!(matches!(config.radix(), Err(PiError::Config(_))));
    }

    #[test]
    fn malformed_digits_rejected_by_parser() {
        assert!(AppConfig::try_parse_from(["picalc", "-n", "ten"]).is_err());
    }
}
