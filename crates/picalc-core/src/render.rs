//! Fixed-digit rendering of high-precision values.

use crate::bigfloat::BigFloat;
use crate::calculator::PiError;
use crate::constants::GUARD_DIGITS;
use crate::precision::Radix;

/// Render `value` with exactly `digits` digits after the radix point.
///
/// The value is first rounded to `digits + GUARD_DIGITS` significant digits,
/// laid out around the radix point, then padded or truncated to `digits`.
///
/// # Example
/// ```
/// use picalc_core::bigfloat::BigFloat;
/// use picalc_core::precision::Radix;
/// use picalc_core::render::render_fixed;
///
/// let half = BigFloat::from_u64(1, 64).div(&BigFloat::from_u64(2, 64)).unwrap();
/// assert_eq!(render_fixed(&half, Radix::Decimal, 3).unwrap(), "0.500");
/// ```
pub fn render_fixed(value: &BigFloat, radix: Radix, digits: usize) -> Result<String, PiError> {
    let significant = digits
        .checked_add(GUARD_DIGITS)
        .ok_or_else(|| PiError::Render(format!("digit count {digits} is too large")))?;
    let parts = value.to_digits(radix.base(), significant)?;
    let mantissa = parts.digits.as_str();
    let exponent = parts.exponent;

    let mut out = String::with_capacity(significant + 4);
    if parts.negative {
        out.push('-');
    }

    if exponent <= 0 {
        out.push_str("0.");
        push_zeros(&mut out, exponent.unsigned_abs());
        out.push_str(mantissa);
    } else {
        let int_len = usize::try_from(exponent)
            .map_err(|_| PiError::Render(format!("exponent {exponent} out of range")))?;
        if int_len >= mantissa.len() {
            out.push_str(mantissa);
            push_zeros(&mut out, (int_len - mantissa.len()) as u64);
            out.push('.');
        } else {
            out.push_str(&mantissa[..int_len]);
            out.push('.');
            out.push_str(&mantissa[int_len..]);
        }
    }

    enforce_fraction_digits(out, digits)
}

/// Pad with zeros or truncate so exactly `digits` characters follow the radix point.
fn enforce_fraction_digits(mut out: String, digits: usize) -> Result<String, PiError> {
    let point = match out.find('.') {
        Some(point) => point,
        None => {
            out.push('.');
            out.len() - 1
        }
    };
    let have = out.len() - point - 1;
    if have < digits {
        push_zeros(&mut out, (digits - have) as u64);
    } else if have > digits {
        out.truncate(point + 1 + digits);
    }

    if out.len() - point - 1 != digits {
        return Err(PiError::Render(format!(
            "expected {digits} fractional digits, produced {}",
            out.len() - point - 1
        )));
    }
    Ok(out)
}

#[allow(clippy::cast_possible_truncation)]
fn push_zeros(out: &mut String, count: u64) {
    out.extend(std::iter::repeat('0').take(count as usize));
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn ratio(numerator: i64, denominator: u64) -> BigFloat {
        BigFloat::from_bigint(&BigInt::from(numerator), 128)
            .div(&BigFloat::from_u64(denominator, 128))
            .unwrap()
    }

    #[test]
    fn exponent_inside_mantissa() {
        assert_eq!(render_fixed(&ratio(314_159, 100_000), Radix::Decimal, 3).unwrap(), "3.141");
    }

    #[test]
    fn exponent_not_positive() {
        assert_eq!(render_fixed(&ratio(1234, 1_000_000), Radix::Decimal, 6).unwrap(), "0.001234");
        assert_eq!(render_fixed(&ratio(1234, 1_000_000), Radix::Decimal, 2).unwrap(), "0.00");
        assert_eq!(render_fixed(&ratio(5, 10), Radix::Decimal, 1).unwrap(), "0.5");
    }

    #[test]
    fn exponent_beyond_mantissa() {
        // 12346 with 2 + 2 significant digits rounds to 1235 * 10
        assert_eq!(render_fixed(&ratio(12_346, 1), Radix::Decimal, 2).unwrap(), "12350.00");
    }

    #[test]
    fn rounding_carry_reaches_integer_part() {
        // 9.9999 at 2 + 2 significant digits is 10.00
        assert_eq!(render_fixed(&ratio(99_999, 10_000), Radix::Decimal, 2).unwrap(), "10.00");
        assert_eq!(render_fixed(&ratio(99_999, 10_000), Radix::Decimal, 1).unwrap(), "10.0");
    }

    #[test]
    fn pads_short_fraction() {
        assert_eq!(render_fixed(&ratio(3, 1), Radix::Decimal, 5).unwrap(), "3.00000");
    }

    #[test]
    fn negative_values_carry_sign() {
        assert_eq!(render_fixed(&ratio(-314_159, 100_000), Radix::Decimal, 2).unwrap(), "-3.14");
    }

    #[test]
    fn hexadecimal_rendering() {
        // 0x3.8 = 3.5
        assert_eq!(render_fixed(&ratio(7, 2), Radix::Hexadecimal, 3).unwrap(), "3.800");
        assert_eq!(render_fixed(&ratio(255, 16), Radix::Hexadecimal, 1).unwrap(), "f.f");
    }

    #[test]
    fn zero_value() {
        assert_eq!(render_fixed(&ratio(0, 1), Radix::Decimal, 3).unwrap(), "0.000");
    }
}
