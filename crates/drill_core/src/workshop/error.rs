use thiserror::Error;

/// Failure of the host key-value storage.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Quota exceeded, access denied, backend gone, ...
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result of a failed workshop store operation.
///
/// Every store failure is returned as a value; nothing here is ever raised
/// past the store boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Workshop name must not be empty")]
    InvalidName,

    #[error("Workshop not found: {id}")]
    NotFound { id: String },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
}

impl StoreError {
    /// Storage failures may go away on retry; bad input will not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            StoreError::StorageUnavailable(_) => true,
            StoreError::InvalidName => false,
            StoreError::NotFound { .. } => false,
        }
    }
}
