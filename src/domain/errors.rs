use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("output tensor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
    #[error("detector not configured")]
    NotConfigured,
    #[error("operation failed: {0}")]
    OperationFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub(crate) fn shape_mismatch(expected: impl Into<String>, actual: &[usize]) -> Self {
        DomainError::ShapeMismatch {
            expected: expected.into(),
            actual: format!("{actual:?}"),
        }
    }
}
