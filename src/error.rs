use std::io;

/// Failure kinds surfaced at store and backup operation boundaries.
///
/// Every variant maps to a user-visible alert in the host UI; none are meant
/// to propagate past the operation that produced them. On any error the
/// in-memory caches are left at their pre-mutation values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required user input is missing (empty category name, unset icon,
    /// empty todo name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A category still referenced by at least one todo cannot be deleted.
    #[error("category \"{0}\" is not empty")]
    CategoryNotEmpty(String),

    /// The key-value backend or the filesystem rejected a read or write.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// A backup document failed parsing or shape validation; nothing was
    /// mutated.
    #[error("invalid backup file: {0}")]
    InvalidBackup(String),

    /// The user dismissed the document picker or share sheet. Informational,
    /// not a fault.
    #[error("cancelled by user")]
    Cancelled,
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
