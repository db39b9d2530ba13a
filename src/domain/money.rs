use rust_decimal::prelude::*;

// ============================================================================
// Money - Fixed-point currency helpers
// ============================================================================
//
// Every amount in the system is a `Decimal` carrying exactly two fractional
// digits. Pricing, aggregation and customer summaries all go through these
// helpers instead of doing raw arithmetic on floats.
//
// Arithmetic saturates at `Decimal::MAX` instead of panicking. Order
// validation bounds prices and quantities well below that point.
//
// ============================================================================

/// Currency precision (cents)
pub const DECIMAL_PLACES: u32 = 2;

/// Round to 2 decimal places, half-up (midpoint away from zero)
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[inline]
pub fn add(a: Decimal, b: Decimal) -> Decimal {
    round2(a.saturating_add(b))
}

/// Subtract `b` from `a`, never going below zero
#[inline]
pub fn subtract(a: Decimal, b: Decimal) -> Decimal {
    round2(a.saturating_sub(b)).max(Decimal::ZERO)
}

/// Line total for `quantity` units at `unit_price`
#[inline]
pub fn multiply(unit_price: Decimal, quantity: u32) -> Decimal {
    round2(unit_price.saturating_mul(Decimal::from(quantity)))
}

/// Clamp `value` into `[min, max]`
#[inline]
pub fn clamp(value: Decimal, min: Decimal, max: Decimal) -> Decimal {
    value.max(min).min(max)
}

/// Sum already-rounded amounts and round the result
pub fn sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    round2(values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add))
}

/// Convert a float coming from an untyped source. NaN and infinities become zero.
pub fn from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or_default()
}

/// Parse a user-entered amount. Anything that is not a number becomes zero.
pub fn parse_lenient(input: &str) -> Decimal {
    let trimmed = input.trim();
    if let Ok(value) = Decimal::from_str(trimmed) {
        return value;
    }
    trimmed.parse::<f64>().map(from_f64).unwrap_or(Decimal::ZERO)
}
