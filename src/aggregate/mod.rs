// ============================================================================
// Aggregate Infrastructure
// ============================================================================
//
// Generic command → event → state plumbing shared by every domain aggregate.
// Nothing in here knows about orders or customers; domain code lives in
// src/domain/.
//
// ============================================================================

pub mod event;
pub mod root;

pub use event::{DomainEvent, EventEnvelope};
pub use root::Aggregate;
