//! Single-term evaluation of the Chudnovsky series.
//!
//! For index `a >= 1`:
//!   P(a) = (6a-5)(2a-1)(6a-1)
//!   Q(a) = a^3 * K
//!   T(a) = (-1)^a * P(a) * (A + B*a)
//! and the base index yields `(1, 1, A)`.

use num_bigint::BigInt;
use num_traits::One;

use crate::bsplit::Triple;
use crate::constants::{CHUDNOVSKY_A, CHUDNOVSKY_B, CHUDNOVSKY_K};

/// Read-only constants of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesConstants {
    /// Additive constant `A`.
    pub a: u64,
    /// Linear coefficient `B`.
    pub b: u64,
    /// Denominator factor `K = 640320^3 / 24`.
    pub k: u64,
}

impl SeriesConstants {
    /// The Chudnovsky constants.
    pub const CHUDNOVSKY: Self = Self {
        a: CHUDNOVSKY_A,
        b: CHUDNOVSKY_B,
        k: CHUDNOVSKY_K,
    };

    /// Exact triple of the term at `index`.
    #[must_use]
    pub fn term(&self, index: u64) -> Triple {
        if index == 0 {
            return Triple {
                p: BigInt::one(),
                q: BigInt::one(),
                t: BigInt::from(self.a),
            };
        }

        let a = BigInt::from(index);
        let p = (&a * 6u32 - 5u32) * (&a * 2u32 - 1u32) * (&a * 6u32 - 1u32);
        let q = &a * &a * &a * self.k;
        let mut t = &p * (&a * self.b + self.a);
        if index & 1 == 1 {
            t = -t;
        }
        Triple { p, q, t }
    }
}

impl Default for SeriesConstants {
    fn default() -> Self {
        Self::CHUDNOVSKY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_term() {
        let term = SeriesConstants::CHUDNOVSKY.term(0);
        assert_eq!(term.p, BigInt::from(1));
        assert_eq!(term.q, BigInt::from(1));
        assert_eq!(term.t, BigInt::from(13_591_409));
    }

    #[test]
    fn first_term_is_negative() {
        let term = SeriesConstants::CHUDNOVSKY.term(1);
        // (6-5)(2-1)(6-1) = 5
        assert_eq!(term.p, BigInt::from(5));
        assert_eq!(term.q, BigInt::from(CHUDNOVSKY_K));
        assert_eq!(term.t, BigInt::from(-5i64 * (13_591_409 + 545_140_134)));
    }

    #[test]
    fn second_term_is_positive() {
        let term = SeriesConstants::CHUDNOVSKY.term(2);
        // (12-5)(4-1)(12-1) = 231
        assert_eq!(term.p, BigInt::from(231));
        assert_eq!(term.q, BigInt::from(8u64) * CHUDNOVSKY_K);
        assert_eq!(
            term.t,
            BigInt::from(231i64 * (13_591_409 + 2 * 545_140_134))
        );
    }

    #[test]
    fn p_and_q_stay_positive() {
        let constants = SeriesConstants::default();
        for index in 0..50 {
            let term = constants.term(index);
            assert!(term.p > BigInt::from(0), "P({index}) not positive");
            assert!(term.q > BigInt::from(0), "Q({index}) not positive");
        }
    }
}
