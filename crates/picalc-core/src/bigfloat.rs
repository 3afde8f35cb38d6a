//! Arbitrary-precision binary floating point.
//!
//! A value is `mantissa * 2^exponent` with `|mantissa| < 2^precision`.
//! Every operation rounds its exact result to nearest, ties to even, at the
//! precision of the left operand.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::calculator::PiError;

/// Maximum corrections of the exponent estimate in [`BigFloat::to_digits`].
const MAX_EXPONENT_CORRECTIONS: usize = 4;

/// High-precision binary floating-point value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigFloat {
    mantissa: BigInt,
    exponent: i64,
    precision: u64,
}

/// Significant digits of a value together with its radix exponent.
///
/// The value is `±0.d1 d2 ... dn * base^exponent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitString {
    /// Whether the value is negative.
    pub negative: bool,
    /// Exactly `n` significant digits (lowercase for base 16).
    pub digits: String,
    /// Radix exponent.
    pub exponent: i64,
}

impl BigFloat {
    /// Round an exact integer to `precision` bits.
    #[must_use]
    pub fn from_bigint(value: &BigInt, precision: u64) -> Self {
        Self::from_parts(value.sign(), value.magnitude().clone(), 0, precision)
    }

    /// Round an exact unsigned integer to `precision` bits.
    #[must_use]
    pub fn from_biguint(value: &BigUint, precision: u64) -> Self {
        Self::from_parts(Sign::Plus, value.clone(), 0, precision)
    }

    /// Round a machine integer to `precision` bits.
    #[must_use]
    pub fn from_u64(value: u64, precision: u64) -> Self {
        Self::from_biguint(&BigUint::from(value), precision)
    }

    /// Build `±magnitude * 2^exponent` rounded to `precision` bits.
    #[must_use]
    pub fn from_parts(sign: Sign, magnitude: BigUint, exponent: i64, precision: u64) -> Self {
        let precision = precision.max(1);
        let (mut magnitude, mut exponent) = round_to_precision(magnitude, exponent, precision);
        // Canonical form: odd mantissa, so equal values compare equal.
        if let Some(zeros) = magnitude.trailing_zeros() {
            magnitude >>= zeros;
            exponent += to_i64_lossy(zeros);
        } else {
            exponent = 0;
        }
        let sign = if magnitude.is_zero() { Sign::NoSign } else { sign };
        Self {
            mantissa: BigInt::from_biguint(sign, magnitude),
            exponent,
            precision,
        }
    }

    /// Working precision in bits.
    #[must_use]
    pub fn precision(&self) -> u64 {
        self.precision
    }

    /// Whether the value is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    /// Whether the value is strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.mantissa.sign() == Sign::Minus
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            mantissa: BigInt::from_biguint(Sign::Plus, self.magnitude().clone()),
            exponent: self.exponent,
            precision: self.precision,
        }
    }

    /// Negation.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            mantissa: -&self.mantissa,
            exponent: self.exponent,
            precision: self.precision,
        }
    }

    fn magnitude(&self) -> &BigUint {
        self.mantissa.magnitude()
    }

    /// Product rounded to nearest.
    #[must_use]
    pub fn mul(&self, rhs: &BigFloat) -> Self {
        Self::from_parts(
            self.mantissa.sign() * rhs.mantissa.sign(),
            self.magnitude() * rhs.magnitude(),
            self.exponent + rhs.exponent,
            self.precision,
        )
    }

    /// Product with a machine integer, rounded to nearest.
    #[must_use]
    pub fn mul_u64(&self, rhs: u64) -> Self {
        let sign = if rhs == 0 {
            Sign::NoSign
        } else {
            self.mantissa.sign()
        };
        Self::from_parts(sign, self.magnitude() * rhs, self.exponent, self.precision)
    }

    /// Quotient rounded to nearest.
    pub fn div(&self, rhs: &BigFloat) -> Result<Self, PiError> {
        if rhs.is_zero() {
            return Err(PiError::Arithmetic("division by zero".into()));
        }
        if self.is_zero() {
            return Ok(Self::from_parts(Sign::NoSign, BigUint::zero(), 0, self.precision));
        }

        // Shift the dividend so the integer quotient keeps two bits beyond the
        // target precision; a nonzero remainder becomes a sticky bit.
        let wanted = self.precision + 2;
        let shift = (wanted + rhs.magnitude().bits()).saturating_sub(self.magnitude().bits()) + 1;
        let dividend = self.magnitude() << shift;
        let (mut quotient, remainder) = dividend.div_rem(rhs.magnitude());
        let mut exponent = self.exponent - rhs.exponent - to_i64(shift)?;
        if !remainder.is_zero() {
            quotient <<= 1u32;
            quotient += 1u32;
            exponent -= 1;
        }

        Ok(Self::from_parts(
            self.mantissa.sign() * rhs.mantissa.sign(),
            quotient,
            exponent,
            self.precision,
        ))
    }

    /// Square root rounded to nearest.
    pub fn sqrt(&self) -> Result<Self, PiError> {
        if self.is_negative() {
            return Err(PiError::Arithmetic("square root of a negative value".into()));
        }
        if self.is_zero() {
            return Ok(self.clone());
        }

        // The radicand needs twice the target bits and an even exponent.
        let wanted = 2 * (self.precision + 2);
        let mut shift = to_i64(wanted.saturating_sub(self.magnitude().bits()))?;
        if (self.exponent - shift) % 2 != 0 {
            shift += 1;
        }
        let radicand = self.magnitude() << shift.unsigned_abs();
        let mut root = radicand.sqrt();
        let mut exponent = (self.exponent - shift) / 2;
        if &root * &root != radicand {
            root <<= 1u32;
            root += 1u32;
            exponent -= 1;
        }

        Ok(Self::from_parts(Sign::Plus, root, exponent, self.precision))
    }

    /// `count` significant digits in `base`, rounded to nearest, with the
    /// exponent `E` such that the value is `0.d1...dcount * base^E`.
    ///
    /// A carry out of the leading digit moves into the exponent, so 9.996
    /// with three digits becomes `"100"` with `E = 2`.
    pub fn to_digits(&self, base: u32, count: usize) -> Result<DigitString, PiError> {
        if !(2..=36).contains(&base) {
            return Err(PiError::Render(format!("unsupported base {base}")));
        }
        if count == 0 {
            return Err(PiError::Render("at least one digit is required".into()));
        }
        if self.is_zero() {
            return Ok(DigitString {
                negative: false,
                digits: "0".repeat(count),
                exponent: 0,
            });
        }

        let count_i64 = to_i64(count as u64)?;
        let lower = pow(base, count_i64 - 1)?;
        let upper = &lower * base;

        let mut exponent = self.estimate_exponent(base);
        for _ in 0..MAX_EXPONENT_CORRECTIONS {
            let scaled = self.scaled_round(base, count_i64 - exponent)?;
            if scaled >= upper {
                exponent += 1;
            } else if scaled < lower {
                exponent -= 1;
            } else {
                return Ok(DigitString {
                    negative: self.is_negative(),
                    digits: scaled.to_str_radix(base),
                    exponent,
                });
            }
        }

        Err(PiError::Render(format!(
            "exponent estimate did not converge for base {base}"
        )))
    }

    /// First guess of `floor(log_base |x|) + 1`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn estimate_exponent(&self, base: u32) -> i64 {
        // |x| lies in [2^(top-1), 2^top)
        let top = to_i64_lossy(self.magnitude().bits()) + self.exponent;
        ((top - 1) as f64 / f64::from(base).log2()).floor() as i64 + 1
    }

    /// `round(|x| * base^power)` to nearest, ties to even.
    fn scaled_round(&self, base: u32, power: i64) -> Result<BigUint, PiError> {
        let mut numerator = self.magnitude().clone();
        let mut denominator = BigUint::one();
        if power >= 0 {
            numerator *= pow(base, power)?;
        } else {
            denominator = pow(base, -power)?;
        }

        if self.exponent >= 0 {
            numerator <<= self.exponent.unsigned_abs();
            Ok(div_round_even(&numerator, &denominator))
        } else if denominator.is_one() {
            Ok(shift_round_even(&numerator, self.exponent.unsigned_abs()))
        } else {
            denominator <<= self.exponent.unsigned_abs();
            Ok(div_round_even(&numerator, &denominator))
        }
    }
}

/// Round `magnitude * 2^exponent` to at most `precision` significant bits.
fn round_to_precision(magnitude: BigUint, exponent: i64, precision: u64) -> (BigUint, i64) {
    let bits = magnitude.bits();
    if bits <= precision {
        return (magnitude, exponent);
    }
    let shift = bits - precision;
    let mut rounded = shift_round_even(&magnitude, shift);
    let mut exponent = exponent + to_i64_lossy(shift);
    if rounded.bits() > precision {
        // Rounded up to the next power of two.
        rounded >>= 1u32;
        exponent += 1;
    }
    (rounded, exponent)
}

/// `value >> shift`, rounded to nearest with ties to even.
fn shift_round_even(value: &BigUint, shift: u64) -> BigUint {
    if shift == 0 {
        return value.clone();
    }
    let mut quotient = value >> shift;
    let half = value.bit(shift - 1);
    let sticky = value
        .trailing_zeros()
        .is_some_and(|zeros| zeros < shift - 1);
    if half && (sticky || quotient.bit(0)) {
        quotient += 1u32;
    }
    quotient
}

/// `numerator / denominator`, rounded to nearest with ties to even.
fn div_round_even(numerator: &BigUint, denominator: &BigUint) -> BigUint {
    let (mut quotient, remainder) = numerator.div_rem(denominator);
    let twice = remainder << 1u32;
    if twice > *denominator || (twice == *denominator && quotient.bit(0)) {
        quotient += 1u32;
    }
    quotient
}

fn pow(base: u32, exponent: i64) -> Result<BigUint, PiError> {
    let exponent = u32::try_from(exponent)
        .map_err(|_| PiError::Render(format!("radix power {exponent} out of range")))?;
    Ok(BigUint::from(base).pow(exponent))
}

/// Bit counts and shifts of in-memory integers always fit in `i64`.
#[allow(clippy::cast_possible_wrap)]
fn to_i64_lossy(value: u64) -> i64 {
    value as i64
}

fn to_i64(value: u64) -> Result<i64, PiError> {
    i64::try_from(value).map_err(|_| PiError::Arithmetic(format!("exponent {value} overflows")))
}
