//! Binary splitting of the Chudnovsky series.
//!
//! A range `[a, b)` is bisected at `m = (a + b) / 2` and the halves are
//! combined with
//!   P = L.P * R.P
//!   Q = L.Q * R.Q
//!   T = L.T * R.Q + L.P * R.T
//! The combine rule is associative but not commutative, so partial results
//! must always be folded in increasing index order.

use std::ops::Range;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::calculator::{PiError, SeriesReducer};
use crate::progress::ProgressSink;
use crate::term::SeriesConstants;

/// Exact partial state of binary splitting over a contiguous index range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    /// Product of the numerator polynomials (always positive).
    pub p: BigInt,
    /// Product of the denominator polynomials (always positive).
    pub q: BigInt,
    /// Accumulated series contribution (either sign).
    pub t: BigInt,
}

impl Triple {
    /// The neutral element of `combine`, representing an empty range.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            p: BigInt::one(),
            q: BigInt::one(),
            t: BigInt::zero(),
        }
    }

    /// Combine the triple of `[a, m)` (self) with the triple of `[m, b)`.
    #[must_use]
    pub fn combine(&self, right: &Triple) -> Triple {
        Triple {
            p: &self.p * &right.p,
            q: &self.q * &right.q,
            t: &self.t * &right.q + &self.p * &right.t,
        }
    }

    /// Encode as `P:Q:T` in lowercase hexadecimal.
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{}:{}:{}",
            self.p.to_str_radix(16),
            self.q.to_str_radix(16),
            self.t.to_str_radix(16)
        )
    }

    /// Decode the output of [`Triple::encode`].
    pub fn decode(text: &str) -> Result<Self, PiError> {
        let mut parts = text.trim().split(':').map(|part| {
            BigInt::parse_bytes(part.as_bytes(), 16)
                .ok_or_else(|| PiError::Checkpoint(format!("invalid triple component: {part:?}")))
        });
        let (Some(p), Some(q), Some(t), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(PiError::Checkpoint(
                "triple must have exactly three components".into(),
            ));
        };
        let triple = Triple {
            p: p?,
            q: q?,
            t: t?,
        };
        if triple.p <= BigInt::zero() || triple.q <= BigInt::zero() {
            return Err(PiError::Checkpoint("P and Q must be positive".into()));
        }
        Ok(triple)
    }
}

/// Sequential recursive binary splitter.
///
/// # Example
/// ```
/// use picalc_core::bsplit::BinarySplitter;
///
/// let splitter = BinarySplitter::new();
/// let whole = splitter.reduce(0, 8);
/// let split = splitter.reduce(0, 3).combine(&splitter.reduce(3, 8));
/// assert_eq!(whole, split);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BinarySplitter {
    constants: SeriesConstants,
}

impl BinarySplitter {
    /// Create a splitter over the Chudnovsky constants.
    #[must_use]
    pub fn new() -> Self {
        Self::with_constants(SeriesConstants::CHUDNOVSKY)
    }

    /// Create a splitter over custom series constants.
    #[must_use]
    pub fn with_constants(constants: SeriesConstants) -> Self {
        Self { constants }
    }

    /// Constants used for leaf evaluation.
    #[must_use]
    pub fn constants(&self) -> SeriesConstants {
        self.constants
    }

    /// Triple of `[a, b)`. An empty range yields [`Triple::identity`].
    #[must_use]
    pub fn reduce(&self, a: u64, b: u64) -> Triple {
        match b.saturating_sub(a) {
            0 => Triple::identity(),
            1 => self.constants.term(a),
            _ => {
                let m = a + (b - a) / 2;
                let left = self.reduce(a, m);
                let right = self.reduce(m, b);
                left.combine(&right)
            }
        }
    }

    /// Same as [`reduce`](Self::reduce), ticking `progress` after every leaf.
    #[must_use]
    pub fn reduce_with_progress(&self, a: u64, b: u64, progress: &ProgressSink) -> Triple {
        match b.saturating_sub(a) {
            0 => Triple::identity(),
            1 => {
                let leaf = self.constants.term(a);
                progress.tick();
                leaf
            }
            _ => {
                let m = a + (b - a) / 2;
                let left = self.reduce_with_progress(a, m, progress);
                let right = self.reduce_with_progress(m, b, progress);
                left.combine(&right)
            }
        }
    }
}

impl SeriesReducer for BinarySplitter {
    fn reduce(
        &self,
        range: Range<u64>,
        progress: Option<&Arc<ProgressSink>>,
    ) -> Result<Triple, PiError> {
        Ok(match progress {
            Some(sink) => self.reduce_with_progress(range.start, range.end, sink),
            None => BinarySplitter::reduce(self, range.start, range.end),
        })
    }

    fn name(&self) -> &'static str {
        "chudnovsky"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observers::NoOpObserver;

    #[test]
    fn single_leaf_matches_term() {
        let splitter = BinarySplitter::new();
        for a in 0..5 {
            assert_eq!(splitter.reduce(a, a + 1), SeriesConstants::CHUDNOVSKY.term(a));
        }
    }

    #[test]
    fn empty_range_is_identity() {
        let splitter = BinarySplitter::new();
        assert_eq!(splitter.reduce(4, 4), Triple::identity());
    }

    #[test]
    fn identity_is_neutral_on_both_sides() {
        let splitter = BinarySplitter::new();
        let triple = splitter.reduce(2, 9);
        assert_eq!(Triple::identity().combine(&triple), triple);
        assert_eq!(triple.combine(&Triple::identity()), triple);
    }

    #[test]
    fn combine_is_associative_for_every_split_point() {
        let splitter = BinarySplitter::new();
        let whole = splitter.reduce(0, 17);
        for m in 1..17 {
            let split = splitter.reduce(0, m).combine(&splitter.reduce(m, 17));
            assert_eq!(split, whole, "split at m={m} differs");
        }
    }

    #[test]
    fn combine_is_not_commutative() {
        let splitter = BinarySplitter::new();
        let left = splitter.reduce(0, 3);
        let right = splitter.reduce(3, 6);
        assert_ne!(left.combine(&right), right.combine(&left));
    }

    #[test]
    fn reduce_with_progress_matches_plain_reduce() {
        let splitter = BinarySplitter::new();
        let sink = ProgressSink::new(Arc::new(NoOpObserver::new()));
        sink.set_total(20);
        let tracked = splitter.reduce_with_progress(0, 20, &sink);
        assert_eq!(tracked, splitter.reduce(0, 20));
        assert_eq!(sink.done(), 20);
    }

    #[test]
    fn encode_decode_preserves_negative_t() {
        let triple = BinarySplitter::new().reduce(1, 2);
        assert!(triple.t < BigInt::zero());
        let decoded = Triple::decode(&triple.encode()).unwrap();
        assert_eq!(decoded, triple);
    }

    #[test]
    fn decode_rejects_malformed_text() {
        assert!(Triple::decode("1:2").is_err());
        assert!(Triple::decode("1:2:3:4").is_err());
        assert!(Triple::decode("1:zz:3").is_err());
        assert!(Triple::decode("0:1:3").is_err());
    }
}
