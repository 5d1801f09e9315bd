//! Fixed-scale decimal arithmetic.
//!
//! Every score and aggregate in this crate is a [`Decimal`] quantized to
//! [`SCALE`] fractional digits with round-half-up. Binary floats never enter
//! the aggregates, so per-document results merge to the same corpus total
//! regardless of platform or fold order.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits kept for scores and metrics.
pub const SCALE: u32 = 10;

/// Round a value to [`SCALE`] digits, half-up.
///
/// All values handled here are non-negative, where "away from zero" and
/// "half up" coincide.
#[must_use]
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator`, quantized. A zero denominator yields zero.
#[must_use]
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator
        .checked_div(denominator)
        .map(quantize)
        .unwrap_or(Decimal::ZERO)
}

/// Ratio of two counts, quantized.
#[must_use]
pub fn count_ratio(numerator: usize, denominator: usize) -> Decimal {
    ratio(Decimal::from(numerator), Decimal::from(denominator))
}
