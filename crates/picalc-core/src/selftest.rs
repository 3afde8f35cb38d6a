//! Self-test against an independent pi reference.
//!
//! The reference uses Machin's formula
//!   pi = 16 * atan(1/5) - 4 * atan(1/239)
//! in binary fixed point and goes through the same renderer, so any
//! disagreement points at the series, the splitter or the assembly.

use std::fmt;
use std::sync::Arc;

use num_bigint::{BigInt, Sign};
use num_traits::{One, Zero};
use tracing::{debug, warn};

use crate::bigfloat::BigFloat;
use crate::bsplit::BinarySplitter;
use crate::calculator::{PiCalculator, PiError, SeriesReducer};
use crate::precision::{PrecisionPlan, Radix};
use crate::render::render_fixed;

/// Outcome of a self-test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfTestReport {
    /// Digits compared.
    pub digits: u64,
    /// Name of the reducer under test.
    pub reducer: &'static str,
    /// Index of the first differing character, if any.
    pub mismatch: Option<usize>,
}

impl SelfTestReport {
    /// Whether the computed digits agree with the reference.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatch.is_none()
    }
}

impl fmt::Display for SelfTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mismatch {
            None => write!(f, "self-test passed: {} digits ({})", self.digits, self.reducer),
            Some(index) => write!(
                f,
                "self-test FAILED: {} digits ({}), first mismatch at character {index}",
                self.digits, self.reducer
            ),
        }
    }
}

/// Compare the sequential splitter with the reference over `digits` decimals.
pub fn self_test(digits: u64) -> Result<SelfTestReport, PiError> {
    self_test_with(Arc::new(BinarySplitter::new()), digits)
}

/// Compare `reducer` with the reference over `digits` decimals.
pub fn self_test_with(
    reducer: Arc<dyn SeriesReducer>,
    digits: u64,
) -> Result<SelfTestReport, PiError> {
    let name = reducer.name();
    let computed = PiCalculator::new(reducer).compute(digits, Radix::Decimal, None)?;
    let reference = machin_pi(digits)?;

    let mismatch = first_mismatch(&computed, &reference);
    match mismatch {
        None => debug!(digits, reducer = name, "Self-test passed"),
        Some(index) => warn!(digits, reducer = name, index, "Self-test mismatch"),
    }
    Ok(SelfTestReport {
        digits,
        reducer: name,
        mismatch,
    })
}

/// Pi to `digits` decimals through Machin's formula.
pub fn machin_pi(digits: u64) -> Result<String, PiError> {
    let plan = PrecisionPlan::new(digits, Radix::Decimal)?;
    // Each series term truncates by at most one unit; the extra bits cover
    // the accumulated truncation of every term.
    let scale_bits = plan.bits + 64 + u64::from(64 - plan.bits.leading_zeros());

    let pi = (arctan_inverse(5, scale_bits) * 16u32) - (arctan_inverse(239, scale_bits) * 4u32);
    let exponent = i64::try_from(scale_bits)
        .map_err(|_| PiError::Arithmetic(format!("scale {scale_bits} overflows")))?;
    let value = BigFloat::from_parts(Sign::Plus, pi.magnitude().clone(), -exponent, plan.bits);

    let width = usize::try_from(digits)
        .map_err(|_| PiError::Config(format!("digit count {digits} is too large")))?;
    render_fixed(&value, Radix::Decimal, width)
}

/// `atan(1/x) * 2^scale_bits`, truncated term by term.
fn arctan_inverse(x: u32, scale_bits: u64) -> BigInt {
    let x_squared = BigInt::from(x) * x;
    let mut power = (BigInt::one() << scale_bits) / x;
    let mut sum = power.clone();
    let mut k: u64 = 1;
    loop {
        power /= &x_squared;
        if power.is_zero() {
            break;
        }
        let term = &power / (2 * k + 1);
        if k % 2 == 1 {
            sum -= term;
        } else {
            sum += term;
        }
        k += 1;
    }
    sum
}

fn first_mismatch(computed: &str, reference: &str) -> Option<usize> {
    computed
        .bytes()
        .zip(reference.bytes())
        .position(|(a, b)| a != b)
        .or_else(|| (computed.len() != reference.len()).then_some(computed.len().min(reference.len())))
}
