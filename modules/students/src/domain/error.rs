use roster_db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Student not found")]
    NotFound,

    #[error("Validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("A student with roll {roll} already exists")]
    DuplicateRoll { roll: i32 },

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl DomainError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Map a failed write, attributing a uniqueness violation to `roll`.
    #[must_use]
    pub fn from_write(err: StoreError, roll: i32) -> Self {
        match err {
            StoreError::Conflict(_) => Self::DuplicateRoll { roll },
            other => other.into(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => Self::NotFound,
            StoreError::Unavailable(msg) => Self::Unavailable(msg),
            StoreError::Conflict(msg) | StoreError::Unknown(msg) => Self::Internal(msg),
        }
    }
}
