use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::options::{
    ClientOptions, FindOneAndReplaceOptions, FindOneAndUpdateOptions, IndexOptions, ResolverConfig,
    ReturnDocument,
};
use mongodb::{Client, Collection, IndexModel};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::config::MongoConfig;
use crate::model::item::{Item, ItemId};
use crate::model::user::User;
use crate::repository::record::{Record, RecordStore, UpsertOutcome};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// How a record type is addressed inside a collection
pub trait MongoRecord: Record + Unpin {
    const KEY_FIELD: &'static str;

    fn key_filter(key: &str) -> Document;
}

impl MongoRecord for Item {
    const KEY_FIELD: &'static str = "id";

    /// Numeric keys match documents stored with either an integer or a string id
    fn key_filter(key: &str) -> Document {
        match ItemId::from(key).as_number() {
            Some(n) => doc! { "id": { "$in": [n, key] } },
            None => doc! { "id": key },
        }
    }
}

impl MongoRecord for User {
    const KEY_FIELD: &'static str = "email";

    fn key_filter(key: &str) -> Document {
        doc! { "email": key }
    }
}

/// Opens a client with short server selection and connect timeouts
pub async fn connect(config: &MongoConfig) -> RepositoryResult<Client> {
    let mut client_options =
        ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    let timeout = Duration::from_secs(config.connection_timeout_secs);
    client_options.app_name = Some("FakeRestApi".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(timeout);
    client_options.server_selection_timeout = Some(timeout);
    let client = Client::with_options(client_options)?;
    info!("MongoDB client created for database {}", config.database);
    Ok(client)
}

pub struct MongoStore<T: MongoRecord> {
    collection: Collection<T>,
}

impl<T: MongoRecord> MongoStore<T> {
    /// Binds to `collection` and makes sure the key field carries a unique index
    #[instrument(skip(client))]
    pub async fn new(client: &Client, database: &str, collection: &str) -> RepositoryResult<Self> {
        let collection = client.database(database).collection::<T>(collection);
        let key_field = T::KEY_FIELD;
        let index = IndexModel::builder()
            .keys(doc! { key_field: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection.create_index(index, None).await.map_err(|e| {
            error!("Failed to ensure unique index on {}: {}", T::KEY_FIELD, e);
            RepositoryError::from(e)
        })?;
        debug!("Unique index on {}.{} is in place", collection.name(), T::KEY_FIELD);
        Ok(MongoStore { collection })
    }
}

#[async_trait]
impl<T: MongoRecord> RecordStore<T> for MongoStore<T> {
    async fn find(&self, key: &str) -> RepositoryResult<Option<T>> {
        Ok(self.collection.find_one(T::key_filter(key), None).await?)
    }

    #[instrument(skip(self, record), fields(kind = T::KIND, key = %record.key()))]
    async fn insert(&self, record: T) -> RepositoryResult<T> {
        let document = bson::to_document(&record)?;
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .build();
        let existing = self
            .collection
            .find_one_and_update(T::key_filter(&record.key()), doc! { "$setOnInsert": document }, options)
            .await?;
        match existing {
            Some(_) => Err(RepositoryError::already_exists(format!("{} {} already exists", T::KIND, record.key()))),
            None => Ok(record),
        }
    }

    async fn replace(&self, record: T) -> RepositoryResult<bool> {
        let previous = self
            .collection
            .find_one_and_replace(T::key_filter(&record.key()), &record, None)
            .await?;
        Ok(previous.is_some())
    }

    async fn upsert(&self, record: T) -> RepositoryResult<UpsertOutcome> {
        let options = FindOneAndReplaceOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .build();
        let previous = self
            .collection
            .find_one_and_replace(T::key_filter(&record.key()), &record, options)
            .await?;
        Ok(match previous {
            Some(_) => UpsertOutcome::Replaced,
            None => UpsertOutcome::Created,
        })
    }

    async fn patch_field(&self, key: &str, field: &str, value: Value) -> RepositoryResult<Option<T>> {
        let value = bson::to_bson(&value)?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        Ok(self
            .collection
            .find_one_and_update(T::key_filter(key), doc! { "$set": { field: value } }, options)
            .await?)
    }

    async fn delete(&self, key: &str) -> RepositoryResult<Option<T>> {
        Ok(self.collection.find_one_and_delete(T::key_filter(key), None).await?)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<T>> {
        let cursor = self.collection.find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self) -> RepositoryResult<usize> {
        let count = self.collection.count_documents(None, None).await?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_item_key_matches_both_forms() {
        let filter = Item::key_filter("100");
        assert_eq!(filter, doc! { "id": { "$in": [100_i64, "100"] } });
    }

    #[test]
    fn test_text_item_key_is_exact() {
        assert_eq!(Item::key_filter("abc"), doc! { "id": "abc" });
        assert_eq!(Item::key_filter("007"), doc! { "id": "007" });
    }

    #[test]
    fn test_user_key_is_email() {
        assert_eq!(User::key_filter("a@b.io"), doc! { "email": "a@b.io" });
    }
}
