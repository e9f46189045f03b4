/// All errors that can be returned by a ProblemStore implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No record with the given business key.
    #[error("problem not found: {number}")]
    NotFound { number: String },

    /// A record with this business key already exists.
    #[error("problem already exists: {number}")]
    AlreadyExists { number: String },

    /// The store refused the write (ACL, business rule, read-only backend).
    #[error("write rejected for problem {number}: {reason}")]
    WriteRejected { number: String, reason: String },

    /// A backend-specific storage error (I/O, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
