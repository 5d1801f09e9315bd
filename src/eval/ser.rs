//! Slot Error Rate (Bossy et al., 2013) and the derived P/R/F.
//!
//! # Counts
//!
//! | Symbol | Meaning |
//! |--------|---------|
//! | `M` | sum of accepted match scores (each in `[0, 1]`) |
//! | `I` | insertions: test annotations left unmatched |
//! | `D` | deletions: reference annotations left unmatched |
//! | `N` | reference annotations |
//! | `P` | test (predicted) annotations |
//!
//! A pair matched with score 0.7 contributes 0.7 to `M` and the missing
//! 0.3 to substitutions:
//!
//! ```text
//! S   = N - D - M
//! SER = (S + I + D) / N
//! P   = M / P,   R = M / N,   F = 2PR / (P + R)
//! ```
//!
//! Empty reference sets get explicit conventions instead of a division
//! by zero (see each accessor).

use crate::numeric::{quantize, ratio};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Mergeable Slot Error Rate accumulator.
///
/// Holds only raw counts; every metric is derived on demand, so merging
/// per-document values with [`update`](Self::update) in any order gives the
/// same corpus figures.
///
/// # Example
///
/// ```rust
/// use ontoeval::eval::SlotErrorRate;
/// use rust_decimal::Decimal;
///
/// let mut total = SlotErrorRate::default();
/// total.update(&SlotErrorRate::from_counts(Decimal::ONE, 0, 1, 2, 1));
/// total.update(&SlotErrorRate::from_counts(Decimal::ONE, 1, 0, 1, 2));
///
/// assert_eq!(total.reference_count(), 3);
/// assert_eq!(total.recall().to_string(), "0.6666666667");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SlotErrorRate {
    matches: Decimal,
    insertions: usize,
    deletions: usize,
    reference_count: usize,
    predicted_count: usize,
}

impl SlotErrorRate {
    /// Build an accumulator from raw counts. `matches` is quantized.
    #[must_use]
    pub fn from_counts(
        matches: Decimal,
        insertions: usize,
        deletions: usize,
        reference_count: usize,
        predicted_count: usize,
    ) -> Self {
        Self {
            matches: quantize(matches),
            insertions,
            deletions,
            reference_count,
            predicted_count,
        }
    }

    /// Merge another accumulator into this one.
    pub fn update(&mut self, other: &SlotErrorRate) {
        self.matches += other.matches;
        self.insertions += other.insertions;
        self.deletions += other.deletions;
        self.reference_count += other.reference_count;
        self.predicted_count += other.predicted_count;
    }

    /// `M`: sum of accepted match scores.
    #[must_use]
    pub fn matches(&self) -> Decimal {
        self.matches
    }

    /// `I`: unmatched test annotations.
    #[must_use]
    pub fn insertions(&self) -> usize {
        self.insertions
    }

    /// `D`: unmatched reference annotations.
    #[must_use]
    pub fn deletions(&self) -> usize {
        self.deletions
    }

    /// `N`: reference annotations.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.reference_count
    }

    /// `P`: test annotations.
    #[must_use]
    pub fn predicted_count(&self) -> usize {
        self.predicted_count
    }

    /// `N - D - M`: matched reference mass that was not fully correct.
    #[must_use]
    pub fn substitutions(&self) -> Decimal {
        Decimal::from(self.reference_count) - Decimal::from(self.deletions) - self.matches
    }

    fn both_empty(&self) -> bool {
        self.reference_count == 0 && self.predicted_count == 0
    }

    /// Slot Error Rate.
    ///
    /// 0 when both sides are empty, 1 when only the reference is empty.
    /// Can exceed 1 when insertions pile up.
    #[must_use]
    pub fn ser(&self) -> Decimal {
        if self.both_empty() {
            return Decimal::ZERO;
        }
        if self.reference_count == 0 {
            return Decimal::ONE;
        }
        let errors =
            self.substitutions() + Decimal::from(self.insertions) + Decimal::from(self.deletions);
        ratio(errors, Decimal::from(self.reference_count))
    }

    /// `M / P`; 1 when both sides are empty, 0 when nothing was predicted.
    #[must_use]
    pub fn precision(&self) -> Decimal {
        if self.both_empty() {
            return Decimal::ONE;
        }
        if self.predicted_count == 0 {
            return Decimal::ZERO;
        }
        ratio(self.matches, Decimal::from(self.predicted_count))
    }

    /// `M / N`; 1 when both sides are empty, 0 when the reference is empty.
    #[must_use]
    pub fn recall(&self) -> Decimal {
        if self.both_empty() {
            return Decimal::ONE;
        }
        if self.reference_count == 0 {
            return Decimal::ZERO;
        }
        ratio(self.matches, Decimal::from(self.reference_count))
    }

    /// Harmonic mean of precision and recall; 0 when precision is 0.
    #[must_use]
    pub fn f_score(&self) -> Decimal {
        let precision = self.precision();
        if precision.is_zero() {
            return Decimal::ZERO;
        }
        let recall = self.recall();
        ratio(Decimal::from(2) * precision * recall, precision + recall)
    }
}

impl AddAssign<&SlotErrorRate> for SlotErrorRate {
    fn add_assign(&mut self, rhs: &SlotErrorRate) {
        self.update(rhs);
    }
}

impl AddAssign for SlotErrorRate {
    fn add_assign(&mut self, rhs: SlotErrorRate) {
        self.update(&rhs);
    }
}

impl Add for SlotErrorRate {
    type Output = SlotErrorRate;

    fn add(mut self, rhs: SlotErrorRate) -> SlotErrorRate {
        self.update(&rhs);
        self
    }
}

impl Sum for SlotErrorRate {
    fn sum<I: Iterator<Item = SlotErrorRate>>(iter: I) -> Self {
        iter.fold(SlotErrorRate::default(), Add::add)
    }
}

impl<'a> Sum<&'a SlotErrorRate> for SlotErrorRate {
    fn sum<I: Iterator<Item = &'a SlotErrorRate>>(iter: I) -> Self {
        iter.fold(SlotErrorRate::default(), |mut acc, s| {
            acc.update(s);
            acc
        })
    }
}

impl fmt::Display for SlotErrorRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SER={} P={} R={} F={} (M={} S={} I={} D={} N={} Pred={})",
            self.ser().round_dp(4),
            self.precision().round_dp(4),
            self.recall().round_dp(4),
            self.f_score().round_dp(4),
            self.matches.round_dp(4),
            self.substitutions().round_dp(4),
            self.insertions,
            self.deletions,
            self.reference_count,
            self.predicted_count,
        )
    }
}
