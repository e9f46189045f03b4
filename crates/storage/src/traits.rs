use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::ProblemRecord;

/// The storage trait for problem record backends.
///
/// ## Read / write model
///
/// `fetch_by_number` hands out an owned copy of the record. Callers mutate
/// that copy freely; nothing is visible to other readers until
/// `persist` writes the whole record back in a single operation. Dropping
/// the copy without persisting discards every in-memory change.
///
/// No locking or versioning is implied: two callers persisting the same
/// record race, and the last write wins unless the backend itself rejects
/// one of them.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait ProblemStore: Send + Sync + 'static {
    /// Read a problem record by its business key.
    ///
    /// Returns `Err(StorageError::NotFound)` if no such record exists.
    async fn fetch_by_number(&self, number: &str) -> Result<ProblemRecord, StorageError>;

    /// Write `record` back, replacing the stored copy.
    ///
    /// `change_reason` is recorded by backends that keep one. Returns the
    /// record as stored, with backend-derived values (such as reference
    /// display labels) filled in.
    ///
    /// Returns `Err(StorageError::NotFound)` if the record does not exist and
    /// `Err(StorageError::WriteRejected)` if the backend refuses the write.
    async fn persist(
        &self,
        record: ProblemRecord,
        change_reason: &str,
    ) -> Result<ProblemRecord, StorageError>;

    /// Add a new record. Used for seeding; the transition engine never
    /// creates records.
    ///
    /// Returns `Err(StorageError::AlreadyExists)` on a duplicate number.
    async fn insert(&self, record: ProblemRecord) -> Result<(), StorageError>;

    /// Business keys of every stored record, in ascending order.
    async fn list_numbers(&self) -> Result<Vec<String>, StorageError>;
}
