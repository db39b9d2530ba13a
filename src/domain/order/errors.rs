use rust_decimal::Decimal;

use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order number cannot be empty")]
    EmptyOrderNumber,

    #[error("Customer name cannot be empty")]
    EmptyCustomerName,

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Item name cannot be empty")]
    EmptyItemName,

    #[error("Invalid item quantity for {item_name}: {quantity}")]
    InvalidQuantity { item_name: String, quantity: u32 },

    #[error("Quantity {quantity} for {item_name} exceeds the maximum of {max}")]
    QuantityTooLarge {
        item_name: String,
        quantity: u32,
        max: u32,
    },

    #[error("Unit price cannot be negative for {0}")]
    NegativeUnitPrice(String),

    #[error("Unit price {unit_price} for {item_name} exceeds the maximum of {max}")]
    UnitPriceTooLarge {
        item_name: String,
        unit_price: Decimal,
        max: Decimal,
    },

    #[error("Backward status transition from {from} to {to} is not allowed")]
    BackwardTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order already exists")]
    AlreadyCreated,

    #[error("Aggregate not initialized")]
    NotInitialized,
}
