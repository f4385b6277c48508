use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, error, instrument, warn};

use crate::repository::record::{self, Record, RecordStore, UpsertOutcome};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

const INDENT: &[u8] = b"   ";

/// Whole-file JSON array store. Every mutation reads the array, changes it and
/// rewrites the file; the mutex serializes this within one process.
pub struct JsonFileStore<T: Record> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Record> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!("Using JSON file {} for {} records", path.display(), T::KIND);
        JsonFileStore { path, lock: Mutex::new(()), _marker: std::marker::PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> RepositoryResult<Vec<T>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("{} not found, treating it as an empty collection", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                error!("Failed to read {}: {}", self.path.display(), e);
                return Err(e.into());
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            error!("{} does not hold a JSON array of {} records: {}", self.path.display(), T::KIND, e);
            RepositoryError::from(e)
        })
    }

    async fn save(&self, records: &[T]) -> RepositoryResult<()> {
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
        records.serialize(&mut serializer)?;
        buf.push(b'\n');

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, &buf).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Wrote {} {} records to {}", records.len(), T::KIND, self.path.display());
        Ok(())
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for JsonFileStore<T> {
    async fn find(&self, key: &str) -> RepositoryResult<Option<T>> {
        let _guard = self.lock.lock().await;
        let records = self.load().await?;
        Ok(record::position(&records, key).map(|index| records[index].clone()))
    }

    #[instrument(skip(self, record), fields(kind = T::KIND, key = %record.key()))]
    async fn insert(&self, record: T) -> RepositoryResult<T> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let inserted = record::insert_into(&mut records, record)?;
        self.save(&records).await?;
        Ok(inserted)
    }

    async fn replace(&self, record: T) -> RepositoryResult<bool> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let replaced = record::replace_in(&mut records, record);
        if replaced {
            self.save(&records).await?;
        }
        Ok(replaced)
    }

    async fn upsert(&self, record: T) -> RepositoryResult<UpsertOutcome> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let outcome = record::upsert_into(&mut records, record);
        self.save(&records).await?;
        Ok(outcome)
    }

    async fn patch_field(&self, key: &str, field: &str, value: Value) -> RepositoryResult<Option<T>> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let updated = record::patch_in(&mut records, key, field, value)?;
        if updated.is_some() {
            self.save(&records).await?;
        }
        Ok(updated)
    }

    async fn delete(&self, key: &str) -> RepositoryResult<Option<T>> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let removed = record::remove_from(&mut records, key);
        if removed.is_some() {
            self.save(&records).await?;
        }
        Ok(removed)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<T>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn count(&self) -> RepositoryResult<usize> {
        Ok(self.list_all().await?.len())
    }
}
