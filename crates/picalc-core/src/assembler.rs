//! Final assembly of pi from the reduced triple.
//!
//! pi = 426880 * sqrt(10005) * Q / T

use num_traits::Zero;
use tracing::trace;

use crate::bigfloat::BigFloat;
use crate::bsplit::Triple;
use crate::calculator::PiError;
use crate::constants::{PI_SCALE, SQRT_ARGUMENT};

/// Turn the triple of `[0, N)` into pi at `bits` bits of precision.
///
/// Only `Q` and `|T|` participate; `P` is carried for combination only.
/// The sign of `T` comes from the alternating terms and is dropped.
///
/// # Errors
/// Returns [`PiError::Arithmetic`] when `T` is zero.
pub fn assemble(triple: &Triple, bits: u64) -> Result<BigFloat, PiError> {
    if triple.t.is_zero() {
        return Err(PiError::Arithmetic("series sum T is zero".into()));
    }

    let root = BigFloat::from_u64(SQRT_ARGUMENT, bits).sqrt()?;
    let numerator = root
        .mul_u64(PI_SCALE)
        .mul(&BigFloat::from_bigint(&triple.q, bits));
    let denominator = BigFloat::from_biguint(triple.t.magnitude(), bits);
    trace!(
        bits,
        q_bits = triple.q.bits(),
        t_bits = triple.t.bits(),
        "assembling pi"
    );
    numerator.div(&denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsplit::BinarySplitter;
    use crate::precision::Radix;
    use crate::render::render_fixed;

    #[test]
    fn three_terms_cover_forty_digits() {
        let triple = BinarySplitter::new().reduce(0, 3);
        let pi = assemble(&triple, 200).unwrap();
        let text = render_fixed(&pi, Radix::Decimal, 25).unwrap();
        assert_eq!(text, "3.1415926535897932384626433");
    }

    #[test]
    fn single_term_is_already_close() {
        let triple = BinarySplitter::new().reduce(0, 1);
        let pi = assemble(&triple, 128).unwrap();
        let text = render_fixed(&pi, Radix::Decimal, 12).unwrap();
        assert_eq!(text, "3.141592653589");
    }

    #[test]
    fn rejects_zero_sum() {
        let mut triple = Triple::identity();
        triple.t = num_bigint::BigInt::zero();
        assert!(matches!(assemble(&triple, 64), Err(PiError::Arithmetic(_))));
    }

    #[test]
    fn sign_of_sum_is_ignored() {
        let triple = BinarySplitter::new().reduce(0, 3);
        let mut flipped = triple.clone();
        flipped.t = -flipped.t;
        let pi = assemble(&triple, 200).unwrap();
        assert_eq!(assemble(&flipped, 200).unwrap(), pi);
        assert!(!pi.is_negative());
    }
}
