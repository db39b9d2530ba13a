// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory. `money` holds the decimal helpers
// every other module prices with; `preparation` is a read-side projection
// over orders for the kitchen.
//
// ============================================================================

pub mod money;
pub mod order;
pub mod customer;
pub mod preparation;
