// ============================================================================
// Order Domain - Business Logic for Order Aggregate
// ============================================================================
//
// - Value objects (OrderItem, SizeType, OrderStatus, DiscountPolicy)
// - Pricing (subtotal / discount / total calculation)
// - Lifecycle (status transition rules)
// - Events, Commands, Errors
// - Aggregate (OrderAggregate with business logic)
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod pricing;
pub mod lifecycle;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

pub use aggregate::OrderAggregate;
pub use command_handler::{HandledCommand, OrderCommandHandler};
pub use commands::OrderCommand;
pub use errors::OrderError;
pub use events::OrderEvent;
pub use lifecycle::TransitionPolicy;
pub use pricing::OrderTotals;
pub use value_objects::{
    CustomerSnapshot, DiscountPolicy, DiscountType, OrderItem, OrderStatus, SizeType,
};
