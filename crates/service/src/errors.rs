use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Caller supplied a value the service cannot interpret (e.g. an unknown gender filter).
    #[error("{0}")]
    InvalidArgument(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self { Self::InvalidArgument(msg.into()) }
}
