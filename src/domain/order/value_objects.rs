use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::money;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Serving size a dish is ordered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeType {
    Plate,
    HalfTray,
    FullTray,
}

impl SizeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeType::Plate => "plate",
            SizeType::HalfTray => "half_tray",
            SizeType::FullTray => "full_tray",
        }
    }

    /// Human-facing label used in kitchen reports
    pub fn label(&self) -> &'static str {
        match self {
            SizeType::Plate => "Plate",
            SizeType::HalfTray => "Half Tray",
            SizeType::FullTray => "Full Tray",
        }
    }
}

impl fmt::Display for SizeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "plate" => Ok(SizeType::Plate),
            "half_tray" => Ok(SizeType::HalfTray),
            "full_tray" => Ok(SizeType::FullTray),
            other => Err(format!("unknown size type: {other}")),
        }
    }
}

/// One dish at one serving size within an order.
///
/// `item_name` and `unit_price` are snapshots taken when the order was placed,
/// so later catalog renames or removals do not change historical orders.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub item_name: String,
    pub size_type: SizeType,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl OrderItem {
    pub fn new(
        item_name: impl Into<String>,
        size_type: SizeType,
        quantity: u32,
        unit_price: Decimal,
    ) -> Self {
        Self {
            item_name: item_name.into(),
            size_type,
            quantity,
            unit_price,
            total_price: money::multiply(unit_price, quantity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Received,
    Delivered,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "received",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "received" => Ok(OrderStatus::Received),
            "delivered" => Ok(OrderStatus::Delivered),
            "paid" => Ok(OrderStatus::Paid),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }

    /// Read a form field. Empty or unknown input means no discount.
    pub fn from_form(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" | "%" => Some(DiscountType::Percentage),
            "fixed" | "amount" => Some(DiscountType::Fixed),
            _ => None,
        }
    }
}

/// Discount policy attached to an order. `discount_type: None` means no discount;
/// `discount_value` is interpreted according to the type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiscountPolicy {
    pub discount_type: Option<DiscountType>,
    pub discount_value: Decimal,
}

impl DiscountPolicy {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn percentage(value: Decimal) -> Self {
        Self {
            discount_type: Some(DiscountType::Percentage),
            discount_value: value,
        }
    }

    pub fn fixed(value: Decimal) -> Self {
        Self {
            discount_type: Some(DiscountType::Fixed),
            discount_value: value,
        }
    }

    /// Build from an untyped numeric input; NaN and infinities count as zero
    pub fn from_f64(discount_type: Option<DiscountType>, value: f64) -> Self {
        Self::typed(discount_type, money::from_f64(value))
    }

    /// Build from raw form fields. An empty or unknown type means no discount,
    /// a non-numeric value means zero.
    pub fn from_form(discount_type: &str, discount_value: &str) -> Self {
        Self::typed(
            DiscountType::from_form(discount_type),
            money::parse_lenient(discount_value),
        )
    }

    fn typed(discount_type: Option<DiscountType>, value: Decimal) -> Self {
        match discount_type {
            Some(DiscountType::Percentage) => Self::percentage(value),
            Some(DiscountType::Fixed) => Self::fixed(value),
            None => Self::none(),
        }
    }
}

/// Who the order is for. `customer_id` links to a customer record when one exists;
/// name and phone are always kept as a snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub customer_id: Option<uuid::Uuid>,
    pub name: String,
    pub phone: Option<String>,
}

// ============================================================================
// Unit Tests
// ============================================================================
