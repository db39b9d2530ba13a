// ============================================================================
// Customer Validation Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    #[error("Customer name cannot be empty")]
    EmptyName,

    #[error("Customer phone cannot be empty")]
    EmptyPhone,

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),
}
