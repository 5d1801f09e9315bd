//! Boundary agreement between two (possibly discontinuous) annotations.
//!
//! # Modes
//!
//! ```text
//! Exact: same spans, same order, nothing else counts
//!   Ref:   [0,4) [15,24)
//!   Test:  [0,4) [15,24)      -> 1
//!   Test:  [15,24) [0,4)      -> 0  (order differs)
//!
//! Jaccard: offsets covered on each side, |∩| / |∪|
//!   Ref:   [====0..10====]
//!   Test:       [====5..15====]
//!   ∩ = 5 offsets, ∪ = 15 offsets  -> 0.3333333333
//! ```
//!
//! Jaccard works on the *union of offsets* per side, so overlapping or
//! repeated segments within one annotation are not double counted.

use crate::numeric::count_ratio;
use crate::span::{covered_offsets, Span};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How span boundaries are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMatch {
    /// 1 if the span lists are identical, else 0.
    Exact,
    /// Segment-adapted Jaccard index over covered offsets.
    #[default]
    Jaccard,
}

impl BoundaryMatch {
    /// All available modes.
    pub fn all() -> &'static [BoundaryMatch] {
        &[BoundaryMatch::Exact, BoundaryMatch::Jaccard]
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BoundaryMatch::Exact => "Exact",
            BoundaryMatch::Jaccard => "Jaccard",
        }
    }
}

/// Score boundary agreement in `[0, 1]`.
///
/// # Example
///
/// ```rust
/// use ontoeval::eval::{boundary_match_score, BoundaryMatch};
/// use ontoeval::Span;
/// use rust_decimal::Decimal;
///
/// let a = [Span::new(0, 10).unwrap()];
/// let b = [Span::new(5, 15).unwrap()];
/// assert_eq!(boundary_match_score(&a, &a, BoundaryMatch::Exact), Decimal::ONE);
/// assert_eq!(boundary_match_score(&a, &b, BoundaryMatch::Exact), Decimal::ZERO);
/// assert!(boundary_match_score(&a, &b, BoundaryMatch::Jaccard) > Decimal::ZERO);
/// ```
#[must_use]
pub fn boundary_match_score(reference: &[Span], test: &[Span], mode: BoundaryMatch) -> Decimal {
    match mode {
        BoundaryMatch::Exact => {
            if reference == test {
                Decimal::ONE
            } else {
                Decimal::ZERO
            }
        }
        BoundaryMatch::Jaccard => jaccard(reference, test),
    }
}

/// Jaccard index of the offsets covered by each side.
///
/// Both sides empty yields 0.
#[must_use]
pub fn jaccard(reference: &[Span], test: &[Span]) -> Decimal {
    let ref_offsets = covered_offsets(reference);
    let test_offsets = covered_offsets(test);

    let intersection = ref_offsets.intersection(&test_offsets).count();
    let union = ref_offsets.len() + test_offsets.len() - intersection;
    count_ratio(intersection, union)
}

/// True if any span on one side shares an offset with any span on the other.
#[must_use]
pub fn spans_overlap(a: &[Span], b: &[Span]) -> bool {
    a.iter().any(|x| b.iter().any(|y| x.overlaps(y)))
}
