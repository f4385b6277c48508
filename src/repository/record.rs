use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::model::item::Item;
use crate::model::user::User;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// A storable record addressed by a single textual key
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Prefix used for per-record keys in key/value stores
    const KIND: &'static str;

    fn key(&self) -> String;
}

impl Record for Item {
    const KIND: &'static str = "item";

    fn key(&self) -> String {
        self.id.key()
    }
}

impl Record for User {
    const KIND: &'static str = "user";

    fn key(&self) -> String {
        self.email.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Replaced,
}

/// Storage capability shared by every backend. Each call is atomic with respect
/// to other calls on the same store.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    async fn find(&self, key: &str) -> RepositoryResult<Option<T>>;
    /// Fails with `AlreadyExists` when the key is taken
    async fn insert(&self, record: T) -> RepositoryResult<T>;
    /// Returns whether a record was replaced; never creates
    async fn replace(&self, record: T) -> RepositoryResult<bool>;
    async fn upsert(&self, record: T) -> RepositoryResult<UpsertOutcome>;
    /// Sets one top-level field and returns the updated record; never creates
    async fn patch_field(&self, key: &str, field: &str, value: Value) -> RepositoryResult<Option<T>>;
    /// Returns the removed record
    async fn delete(&self, key: &str) -> RepositoryResult<Option<T>>;
    async fn list_all(&self) -> RepositoryResult<Vec<T>>;
    async fn count(&self) -> RepositoryResult<usize>;
}

// Vec operations shared by the in-process stores.

pub(crate) fn position<T: Record>(records: &[T], key: &str) -> Option<usize> {
    records.iter().position(|r| r.key() == key)
}

pub(crate) fn insert_into<T: Record>(records: &mut Vec<T>, record: T) -> RepositoryResult<T> {
    let key = record.key();
    if position(records, &key).is_some() {
        return Err(RepositoryError::already_exists(format!("{} {} already exists", T::KIND, key)));
    }
    records.push(record.clone());
    Ok(record)
}

pub(crate) fn replace_in<T: Record>(records: &mut [T], record: T) -> bool {
    match position(records, &record.key()) {
        Some(index) => {
            records[index] = record;
            true
        }
        None => false,
    }
}

pub(crate) fn upsert_into<T: Record>(records: &mut Vec<T>, record: T) -> UpsertOutcome {
    match position(records, &record.key()) {
        Some(index) => {
            records[index] = record;
            UpsertOutcome::Replaced
        }
        None => {
            records.push(record);
            UpsertOutcome::Created
        }
    }
}

pub(crate) fn patch_in<T: Record>(
    records: &mut [T],
    key: &str,
    field: &str,
    value: Value,
) -> RepositoryResult<Option<T>> {
    let Some(index) = position(records, key) else {
        return Ok(None);
    };
    let updated = with_field(&records[index], field, value)?;
    records[index] = updated.clone();
    Ok(Some(updated))
}

pub(crate) fn remove_from<T: Record>(records: &mut Vec<T>, key: &str) -> Option<T> {
    position(records, key).map(|index| records.remove(index))
}

/// Copy of `record` with one top-level field overwritten
pub(crate) fn with_field<T: Record>(record: &T, field: &str, value: Value) -> RepositoryResult<T> {
    let mut json = serde_json::to_value(record)?;
    match json.as_object_mut() {
        Some(object) => {
            object.insert(field.to_string(), value);
        }
        None => {
            return Err(RepositoryError::serialization(format!(
                "{} does not serialize to an object",
                T::KIND
            )))
        }
    }
    Ok(serde_json::from_value(json)?)
}
