//! Constants for the Chudnovsky series, precision planning and configuration.

/// Series constant `A` of the Chudnovsky formula.
pub const CHUDNOVSKY_A: u64 = 13_591_409;

/// Series constant `B` of the Chudnovsky formula.
pub const CHUDNOVSKY_B: u64 = 545_140_134;

/// `640320^3 / 24`, the per-term denominator factor.
pub const CHUDNOVSKY_K: u64 = 10_939_058_860_032_000;

/// Argument of the square root in `pi = 426880 * sqrt(10005) * Q / T`.
pub const SQRT_ARGUMENT: u64 = 10_005;

/// Scale factor in `pi = 426880 * sqrt(10005) * Q / T`.
pub const PI_SCALE: u64 = 426_880;

/// Decimal digits contributed by each series term (empirical).
pub const DIGITS_PER_TERM: f64 = 14.181_647_462_725_477;

/// `log2(10)`: bits needed per decimal digit.
pub const LOG2_10: f64 = 3.321_928_094_887_362_6;

/// `log10(16)`: decimal digits carried by one hexadecimal digit.
pub const LOG10_16: f64 = 1.204_119_982_655_924_8;

/// Extra working precision (in bits) absorbing rounding in the final assembly.
pub const GUARD_BITS: u64 = 64;

/// Extra significant digits requested from the renderer before truncation.
pub const GUARD_DIGITS: usize = 2;

/// Extra terms added on top of the convergence estimate.
pub const EXTRA_TERMS: u64 = 1;

/// Minimum progress change (1%) before a throttled observer reports.
pub const PROGRESS_REPORT_THRESHOLD: f64 = 0.01;

/// Default number of chunks handed to each worker thread when the chunk
/// size is derived automatically.
pub const CHUNKS_PER_THREAD: u64 = 1;

/// Upper bound on worker threads accepted from configuration.
pub const MAX_THREADS: usize = 1024;

/// Process exit codes.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// Self-test produced digits that disagree with the reference.
    pub const ERROR_SELF_TEST: i32 = 5;
    /// Worker pool misuse or a failed worker task.
    pub const ERROR_POOL: i32 = 6;
}
