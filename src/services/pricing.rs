//! Rental price calculation.
//!
//! Every call site that shows or charges a rental price goes through
//! [`compute_breakdown`]. Amounts are exact decimals; each step is rounded to
//! two places half-up (midpoint away from zero), and conversion to minor
//! currency units happens once, in [`to_minor_units`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::ValidationError;
use crate::models::{PriceBreakdown, RentalQuote};

/// Flat GST rate applied to every rental subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

const DECIMAL_PLACES: u32 = 2;

pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Number of rental days between two calendar dates, never less than one.
///
/// A reversed range counts as its absolute length; submission-time
/// validation rejects it separately.
pub fn rental_days(quote: &RentalQuote) -> i64 {
    (quote.end_date - quote.start_date).num_days().abs().max(1)
}

fn checked_product(values: &[Decimal]) -> Result<Decimal, ValidationError> {
    values
        .iter()
        .try_fold(Decimal::ONE, |acc, v| acc.checked_mul(*v))
        .ok_or(ValidationError::AmountOutOfRange)
}

pub fn compute_breakdown(quote: &RentalQuote) -> Result<PriceBreakdown, ValidationError> {
    let days = rental_days(quote);
    let subtotal = round2(checked_product(&[
        quote.daily_price,
        Decimal::from(days),
        Decimal::from(quote.quantity),
    ])?);
    let tax = round2(checked_product(&[subtotal, TAX_RATE])?);
    let total = round2(
        subtotal
            .checked_add(tax)
            .ok_or(ValidationError::AmountOutOfRange)?,
    );

    Ok(PriceBreakdown {
        days,
        subtotal,
        tax,
        total,
    })
}

/// Major units to integer minor units, rounding half-up to the nearest minor unit.
///
/// Fails with [`ValidationError::AmountOutOfRange`] when the result does not
/// fit the `i64` minor-unit columns.
pub fn to_minor_units(amount: Decimal) -> Result<i64, ValidationError> {
    round2(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.to_i64())
        .ok_or(ValidationError::AmountOutOfRange)
}

pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, DECIMAL_PLACES)
}
