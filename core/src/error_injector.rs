//! Transaction error injection.
//!
//! The error decision is made once per customer and shared by every
//! transaction of that customer: a whole batch is mis-entered, errors
//! are not scattered line by line. Injected errors are always an
//! overcharge.

use crate::{
    rng::StreamRng,
    types::{round_cents, Percent},
};

/// Inclusive lower bound of the overcharge multiplier.
pub const MIN_INFLATION: f64 = 1.20;
/// Exclusive upper bound of the overcharge multiplier.
pub const MAX_INFLATION: f64 = 1.50;

/// One Bernoulli draw with p = error_rate / 100.
pub fn decide_customer_has_error(rng: &mut StreamRng, error_rate: Percent) -> bool {
    rng.chance(error_rate.probability())
}

/// Line total for `unit_count × price_per_unit`, rounded to cents.
///
/// With `has_error` the correct total is multiplied by a factor drawn
/// from [1.20, 1.50) before rounding. The correct path draws nothing
/// from `rng`.
pub fn compute_transaction_total(
    unit_count: u32,
    price_per_unit: f64,
    has_error: bool,
    rng: &mut StreamRng,
) -> f64 {
    let correct = correct_total(unit_count, price_per_unit);
    if !has_error {
        return correct;
    }
    let factor = rng.uniform(MIN_INFLATION, MAX_INFLATION);
    round_cents(correct * factor)
}

/// The arithmetic truth for a line; shared with reconciliation.
pub fn correct_total(unit_count: u32, price_per_unit: f64) -> f64 {
    round_cents(unit_count as f64 * price_per_unit)
}
