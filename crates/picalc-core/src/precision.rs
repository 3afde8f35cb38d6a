//! Mapping from a requested digit count to working precision and term count.

use crate::calculator::PiError;
use crate::constants::{DIGITS_PER_TERM, EXTRA_TERMS, GUARD_BITS, LOG10_16, LOG2_10};

/// Output radix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Radix {
    /// Base 10.
    #[default]
    Decimal,
    /// Base 16, lowercase digits.
    Hexadecimal,
}

impl Radix {
    /// Validate a numeric base.
    pub fn from_base(base: u32) -> Result<Self, PiError> {
        match base {
            10 => Ok(Self::Decimal),
            16 => Ok(Self::Hexadecimal),
            other => Err(PiError::Config(format!(
                "unsupported base {other} (expected 10 or 16)"
            ))),
        }
    }

    /// Numeric base.
    #[must_use]
    pub fn base(self) -> u32 {
        match self {
            Self::Decimal => 10,
            Self::Hexadecimal => 16,
        }
    }

    /// Bits of precision carried by one output digit.
    #[must_use]
    pub fn bits_per_digit(self) -> f64 {
        match self {
            Self::Decimal => LOG2_10,
            Self::Hexadecimal => 4.0,
        }
    }

    /// Decimal digits of accuracy carried by one output digit.
    #[must_use]
    pub fn decimal_digits_per_digit(self) -> f64 {
        match self {
            Self::Decimal => 1.0,
            Self::Hexadecimal => LOG10_16,
        }
    }
}

/// Working precision and series length for one computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionPlan {
    /// Requested digits after the radix point.
    pub digits: u64,
    /// Output radix.
    pub radix: Radix,
    /// Working precision in bits.
    pub bits: u64,
    /// Number of series terms to sum.
    pub term_count: u64,
}

impl PrecisionPlan {
    /// Plan a computation of `digits` digits in `radix`.
    ///
    /// # Example
    /// ```
    /// use picalc_core::precision::{PrecisionPlan, Radix};
    ///
    /// let plan = PrecisionPlan::new(1000, Radix::Decimal).unwrap();
    /// assert_eq!(plan.bits, 3386);
    /// assert_eq!(plan.term_count, 72);
    /// ```
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn new(digits: u64, radix: Radix) -> Result<Self, PiError> {
        if digits == 0 {
            return Err(PiError::Config("digits must be at least 1".into()));
        }

        let digits_f = digits as f64;
        let bits = (digits_f * radix.bits_per_digit() + GUARD_BITS as f64).ceil() as u64;
        let decimal_digits = digits_f * radix.decimal_digits_per_digit();
        let term_count = (decimal_digits / DIGITS_PER_TERM).ceil() as u64 + EXTRA_TERMS;

        Ok(Self {
            digits,
            radix,
            bits,
            term_count,
        })
    }
}
