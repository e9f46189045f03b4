use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::record::{FieldKind, ProblemRecord};
use crate::seed::SeedFile;
use crate::traits::ProblemStore;

/// table -> key -> display label.
pub type ReferenceDirectory = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<String, ProblemRecord>,
    change_reasons: BTreeMap<String, String>,
    writes_enabled: bool,
}

/// In-process `ProblemStore` backed by a map.
///
/// Reference fields get their display value from the reference directory
/// whenever a record is inserted or persisted.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    references: ReferenceDirectory,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_references(ReferenceDirectory::new())
    }

    pub fn with_references(references: ReferenceDirectory) -> Self {
        Self {
            inner: RwLock::new(Inner {
                writes_enabled: true,
                ..Inner::default()
            }),
            references,
        }
    }

    /// Build a store holding every problem in `seed`.
    pub async fn from_seed(seed: SeedFile) -> Result<Self, StorageError> {
        let store = Self::with_references(seed.references);
        for record in seed.problems {
            store.insert(record).await?;
        }
        Ok(store)
    }

    /// When disabled, every `persist` fails with `WriteRejected`.
    pub async fn set_writes_enabled(&self, enabled: bool) {
        self.inner.write().await.writes_enabled = enabled;
    }

    /// The change reason passed to the most recent successful `persist`.
    pub async fn last_change_reason(&self, number: &str) -> Option<String> {
        self.inner.read().await.change_reasons.get(number).cloned()
    }

    fn resolve_references(&self, record: &mut ProblemRecord) {
        for field in record.fields_mut() {
            let label = match field.kind() {
                FieldKind::Reference { table } => self
                    .references
                    .get(table)
                    .and_then(|keys| keys.get(field.value()))
                    .cloned(),
                _ => continue,
            };
            field.set_resolved_display(label);
        }
    }
}

#[async_trait]
impl ProblemStore for MemoryStore {
    async fn fetch_by_number(&self, number: &str) -> Result<ProblemRecord, StorageError> {
        let inner = self.inner.read().await;
        inner
            .records
            .get(number)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                number: number.to_string(),
            })
    }

    async fn persist(
        &self,
        mut record: ProblemRecord,
        change_reason: &str,
    ) -> Result<ProblemRecord, StorageError> {
        let mut inner = self.inner.write().await;
        let number = record.number().to_string();
        if !inner.records.contains_key(&number) {
            return Err(StorageError::NotFound { number });
        }
        if !inner.writes_enabled {
            return Err(StorageError::WriteRejected {
                number,
                reason: "store is read-only".to_string(),
            });
        }

        self.resolve_references(&mut record);
        tracing::debug!(%number, change_reason, "persisting problem record");
        inner
            .change_reasons
            .insert(number.clone(), change_reason.to_string());
        inner.records.insert(number, record.clone());
        Ok(record)
    }

    async fn insert(&self, mut record: ProblemRecord) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        let number = record.number().to_string();
        if inner.records.contains_key(&number) {
            return Err(StorageError::AlreadyExists { number });
        }
        record.ensure_number_field();
        self.resolve_references(&mut record);
        inner.records.insert(number, record);
        Ok(())
    }

    async fn list_numbers(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.inner.read().await.records.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;

    fn directory() -> ReferenceDirectory {
        BTreeMap::from([(
            "sys_user".to_string(),
            BTreeMap::from([
                ("abc123".to_string(), "Beth Anglin".to_string()),
                ("def456".to_string(), "Fred Luddy".to_string()),
            ]),
        )])
    }

    fn problem() -> ProblemRecord {
        ProblemRecord::new("PRB0040001")
            .with_field("assigned_to", Field::reference("sys_user", "abc123"))
    }

    #[tokio::test]
    async fn insert_resolves_reference_labels() {
        let store = MemoryStore::with_references(directory());
        store.insert(problem()).await.unwrap();

        let record = store.fetch_by_number("PRB0040001").await.unwrap();
        assert_eq!(record.field("assigned_to").unwrap().display_value(), "Beth Anglin");
    }

    #[tokio::test]
    async fn persist_re_resolves_changed_reference() {
        let store = MemoryStore::with_references(directory());
        store.insert(problem()).await.unwrap();

        let mut record = store.fetch_by_number("PRB0040001").await.unwrap();
        record.set_value("assigned_to", "def456");
        let stored = store.persist(record, "reassign").await.unwrap();

        assert_eq!(stored.field("assigned_to").unwrap().display_value(), "Fred Luddy");
        assert_eq!(
            store.last_change_reason("PRB0040001").await.as_deref(),
            Some("reassign")
        );
    }

    #[tokio::test]
    async fn disabled_writes_reject_persist() {
        let store = MemoryStore::new();
        store.insert(problem()).await.unwrap();
        store.set_writes_enabled(false).await;

        let record = store.fetch_by_number("PRB0040001").await.unwrap();
        let err = store.persist(record, "noop").await.unwrap_err();
        assert!(matches!(err, StorageError::WriteRejected { .. }));
        assert_eq!(store.last_change_reason("PRB0040001").await, None);
    }

    #[tokio::test]
    async fn insert_aligns_number_field_with_key() {
        let store = MemoryStore::new();
        let record = ProblemRecord::new("PRB0040001")
            .with_field("number", Field::text("PRB0049999"));
        store.insert(record).await.unwrap();

        let stored = store.fetch_by_number("PRB0040001").await.unwrap();
        assert_eq!(stored.value("number"), Some("PRB0040001"));
    }
}
