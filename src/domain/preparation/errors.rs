// ============================================================================
// Preparation Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PreparationError {
    #[error("Invalid delivery date: {0}")]
    InvalidDeliveryDate(String),

    #[error("Invalid status filter: {0}")]
    InvalidStatusFilter(String),
}
