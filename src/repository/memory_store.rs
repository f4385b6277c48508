use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::repository::record::{self, Record, RecordStore, UpsertOutcome};
use crate::repository::repository_error::RepositoryResult;

/// Process-local store. Nothing survives a restart.
pub struct MemoryStore<T: Record> {
    records: RwLock<Vec<T>>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<T>) -> Self {
        debug!("Creating in-memory {} store with {} records", T::KIND, records.len());
        MemoryStore { records: RwLock::new(records) }
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for MemoryStore<T> {
    async fn find(&self, key: &str) -> RepositoryResult<Option<T>> {
        let records = self.records.read().await;
        Ok(record::position(&records, key).map(|index| records[index].clone()))
    }

    #[instrument(skip(self, record), fields(kind = T::KIND, key = %record.key()))]
    async fn insert(&self, record: T) -> RepositoryResult<T> {
        let mut records = self.records.write().await;
        record::insert_into(&mut records, record)
    }

    async fn replace(&self, record: T) -> RepositoryResult<bool> {
        let mut records = self.records.write().await;
        Ok(record::replace_in(&mut records, record))
    }

    async fn upsert(&self, record: T) -> RepositoryResult<UpsertOutcome> {
        let mut records = self.records.write().await;
        Ok(record::upsert_into(&mut records, record))
    }

    async fn patch_field(&self, key: &str, field: &str, value: Value) -> RepositoryResult<Option<T>> {
        let mut records = self.records.write().await;
        record::patch_in(&mut records, key, field, value)
    }

    async fn delete(&self, key: &str) -> RepositoryResult<Option<T>> {
        let mut records = self.records.write().await;
        Ok(record::remove_from(&mut records, key))
    }

    async fn list_all(&self) -> RepositoryResult<Vec<T>> {
        Ok(self.records.read().await.clone())
    }

    async fn count(&self) -> RepositoryResult<usize> {
        Ok(self.records.read().await.len())
    }
}
