use thiserror::Error;

/// Errors raised by the catalog, the clock and playback.
///
/// These propagate to the immediate caller, which decides how the UI reacts
/// (ignore, show a message, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrillError {
    #[error("Index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Drill data arrays disagree with each other. Indicates an authoring
    /// defect in the catalog and cannot be recovered at runtime.
    #[error("Invalid drill data: {0}")]
    InvalidState(String),
}

impl DrillError {
    pub fn out_of_range(index: usize, len: usize) -> Self {
        DrillError::OutOfRange { index, len }
    }

    pub fn is_recoverable(&self) -> bool {
        match self {
            DrillError::OutOfRange { .. } => true,
            DrillError::NotFound(_) => true,
            DrillError::InvalidState(_) => false,
        }
    }
}

impl From<serde_json::Error> for DrillError {
    fn from(err: serde_json::Error) -> Self {
        DrillError::InvalidState(format!("malformed drill data: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, DrillError>;
