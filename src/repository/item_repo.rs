use async_trait::async_trait;

use crate::model::item::{Item, ItemId, ItemPatch};
use crate::repository::record::{RecordStore, UpsertOutcome};
use crate::repository::repository_error::RepositoryResult;

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn find(&self, id: &ItemId) -> RepositoryResult<Option<Item>>;
    async fn insert(&self, item: Item) -> RepositoryResult<Item>;
    async fn replace(&self, item: Item) -> RepositoryResult<bool>;
    async fn upsert(&self, item: Item) -> RepositoryResult<UpsertOutcome>;
    async fn patch_field(&self, id: &ItemId, patch: &ItemPatch) -> RepositoryResult<Option<Item>>;
    async fn delete(&self, id: &ItemId) -> RepositoryResult<Option<Item>>;
    async fn list_all(&self) -> RepositoryResult<Vec<Item>>;
    async fn count(&self) -> RepositoryResult<usize>;
}

#[async_trait]
impl<S> ItemRepository for S
where
    S: RecordStore<Item>,
{
    async fn find(&self, id: &ItemId) -> RepositoryResult<Option<Item>> {
        RecordStore::find(self, &id.key()).await
    }

    async fn insert(&self, item: Item) -> RepositoryResult<Item> {
        RecordStore::insert(self, item).await
    }

    async fn replace(&self, item: Item) -> RepositoryResult<bool> {
        RecordStore::replace(self, item).await
    }

    async fn upsert(&self, item: Item) -> RepositoryResult<UpsertOutcome> {
        RecordStore::upsert(self, item).await
    }

    async fn patch_field(&self, id: &ItemId, patch: &ItemPatch) -> RepositoryResult<Option<Item>> {
        RecordStore::patch_field(self, &id.key(), patch.field().as_str(), patch.json_value()).await
    }

    async fn delete(&self, id: &ItemId) -> RepositoryResult<Option<Item>> {
        RecordStore::delete(self, &id.key()).await
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Item>> {
        RecordStore::list_all(self).await
    }

    async fn count(&self) -> RepositoryResult<usize> {
        RecordStore::count(self).await
    }
}
