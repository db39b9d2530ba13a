use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::money;
use super::value_objects::{DiscountPolicy, DiscountType, OrderItem};

// ============================================================================
// Order Pricing Calculator
// ============================================================================
//
// subtotal = round2(Σ round2(unit_price × quantity))
// discount = percentage: round2(subtotal × clamp(value, 0, 100) / 100)
//            fixed:      round2(clamp(value, 0, subtotal))
// total    = max(0, round2(subtotal - discount))
//
// Out-of-range discount values are clamped, never rejected.
//
// ============================================================================

/// Everything the calculator needs. Callers build this from their edit state
/// and hand it over by reference.
#[derive(Debug, Clone, Copy)]
pub struct PricingInput<'a> {
    pub items: &'a [OrderItem],
    pub discount: &'a DiscountPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
}

/// A clamp the calculator is going to apply to a discount value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountWarning {
    NegativeValue { value: Decimal },
    PercentageAboveHundred { value: Decimal },
    FixedExceedsSubtotal { value: Decimal, subtotal: Decimal },
}

pub struct OrderPricingCalculator;

impl OrderPricingCalculator {
    pub fn compute(input: &PricingInput<'_>) -> OrderTotals {
        compute_totals(input.items, input.discount)
    }
}

pub fn subtotal(items: &[OrderItem]) -> Decimal {
    money::sum(items.iter().map(|item| money::multiply(item.unit_price, item.quantity)))
}

/// Effective discount value after clamping, for the given subtotal
pub fn effective_discount_value(policy: &DiscountPolicy, subtotal: Decimal) -> Decimal {
    match policy.discount_type {
        None => Decimal::ZERO,
        Some(DiscountType::Percentage) => {
            money::clamp(policy.discount_value, Decimal::ZERO, Decimal::ONE_HUNDRED)
        }
        Some(DiscountType::Fixed) => money::clamp(policy.discount_value, Decimal::ZERO, subtotal),
    }
}

pub fn compute_totals(items: &[OrderItem], discount: &DiscountPolicy) -> OrderTotals {
    let subtotal = subtotal(items);
    let value = effective_discount_value(discount, subtotal);

    let discount_amount = match discount.discount_type {
        None => Decimal::ZERO,
        Some(DiscountType::Percentage) => {
            money::round2(subtotal.saturating_mul(value) / Decimal::ONE_HUNDRED)
        }
        Some(DiscountType::Fixed) => money::round2(value),
    };

    OrderTotals {
        subtotal,
        discount_amount,
        total: money::subtract(subtotal, discount_amount),
    }
}

/// Report which clamps `compute_totals` would apply. Does not change the result;
/// callers that want stricter feedback show these before saving.
pub fn review_discount(discount: &DiscountPolicy, subtotal: Decimal) -> Vec<DiscountWarning> {
    let value = discount.discount_value;
    let mut warnings = Vec::new();

    let Some(discount_type) = discount.discount_type else {
        return warnings;
    };

    if value < Decimal::ZERO {
        warnings.push(DiscountWarning::NegativeValue { value });
        return warnings;
    }

    match discount_type {
        DiscountType::Percentage if value > Decimal::ONE_HUNDRED => {
            warnings.push(DiscountWarning::PercentageAboveHundred { value });
        }
        DiscountType::Fixed if value > subtotal => {
            warnings.push(DiscountWarning::FixedExceedsSubtotal { value, subtotal });
        }
        _ => {}
    }

    warnings
}
