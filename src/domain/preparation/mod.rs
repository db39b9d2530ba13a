// ============================================================================
// Preparation Domain - Kitchen manifest per delivery date
// ============================================================================

pub mod aggregator;
pub mod errors;
pub mod export;

pub use aggregator::*;
pub use errors::*;
pub use export::*;
