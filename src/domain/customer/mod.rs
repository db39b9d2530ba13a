// ============================================================================
// Customer Domain
// ============================================================================
//
// - Value objects (Email, PhoneNumber)
// - Errors (CustomerError enum)
// - Record (Customer with registration validation)
// - Summary (per-customer order metrics, list filtering and sorting)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod record;
pub mod summary;

pub use errors::CustomerError;
pub use record::{Customer, NewCustomer};
pub use summary::{
    build_customer_entries, filter_and_sort, summarize, CustomerFilter, CustomerSummary,
};
