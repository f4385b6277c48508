use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::PutPolicy;
use crate::model::item::{Item, ItemId, ItemPatch};
use crate::repository::item_repo::ItemRepository;
use crate::repository::record::UpsertOutcome;
use crate::repository::repository_error::RepositoryError;
use crate::util::error::ServiceError;

const PRICE_TOLERANCE: f64 = 1e-9;

#[async_trait]
pub trait ItemService: Send + Sync {
    async fn get_item(&self, id: &ItemId) -> Result<Item, ServiceError>;
    /// The item only when its price also matches
    async fn get_item_with_price(&self, id: &ItemId, price: f64) -> Result<Item, ServiceError>;
    async fn list_items(&self) -> Result<Vec<Item>, ServiceError>;
    /// Number of stored items, as reported by the store
    async fn count_items(&self) -> Result<usize, ServiceError>;
    async fn add_item(&self, item: Item) -> Result<Item, ServiceError>;
    /// Full replacement. Whether a missing id is created depends on the PUT policy.
    async fn update_item(&self, item: Item) -> Result<(Item, UpsertOutcome), ServiceError>;
    async fn patch_item(&self, id: &ItemId, patch: ItemPatch) -> Result<Item, ServiceError>;
    async fn delete_item(&self, id: &ItemId) -> Result<Item, ServiceError>;
}

pub struct ItemServiceImpl {
    pub item_repo: Arc<dyn ItemRepository>,
    pub put_policy: PutPolicy,
}

impl ItemServiceImpl {
    pub fn new(item_repo: Arc<dyn ItemRepository>, put_policy: PutPolicy) -> Self {
        Self { item_repo, put_policy }
    }
}

fn not_found(id: &ItemId) -> ServiceError {
    ServiceError::NotFound(format!("ID {} not found", id))
}

#[async_trait]
impl ItemService for ItemServiceImpl {
    #[instrument(skip(self), fields(id = %id))]
    async fn get_item(&self, id: &ItemId) -> Result<Item, ServiceError> {
        self.item_repo.find(id).await?.ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_item_with_price(&self, id: &ItemId, price: f64) -> Result<Item, ServiceError> {
        match self.item_repo.find(id).await? {
            Some(item) if (item.price - price).abs() < PRICE_TOLERANCE => Ok(item),
            _ => Err(ServiceError::NotFound(format!("ID {} with price {} not found", id, price))),
        }
    }

    #[instrument(skip(self))]
    async fn list_items(&self) -> Result<Vec<Item>, ServiceError> {
        let items = self.item_repo.list_all().await?;
        debug!("Listed {} items", items.len());
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn count_items(&self) -> Result<usize, ServiceError> {
        let count = self.item_repo.count().await?;
        debug!("Store holds {} items", count);
        Ok(count)
    }

    #[instrument(skip(self, item), fields(id = %item.id))]
    async fn add_item(&self, item: Item) -> Result<Item, ServiceError> {
        match self.item_repo.insert(item).await {
            Ok(item) => {
                info!("Item added");
                Ok(item)
            }
            Err(RepositoryError::AlreadyExists(_)) => {
                warn!("Item already exists, nothing added");
                Err(ServiceError::Conflict("ID already exists, adding item failed".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, item), fields(id = %item.id, policy = ?self.put_policy))]
    async fn update_item(&self, item: Item) -> Result<(Item, UpsertOutcome), ServiceError> {
        match self.put_policy {
            PutPolicy::Upsert => {
                let outcome = self.item_repo.upsert(item.clone()).await?;
                info!("Item stored ({:?})", outcome);
                Ok((item, outcome))
            }
            PutPolicy::Strict => {
                if self.item_repo.replace(item.clone()).await? {
                    info!("Item replaced");
                    Ok((item, UpsertOutcome::Replaced))
                } else {
                    Err(not_found(&item.id))
                }
            }
        }
    }

    #[instrument(skip(self, patch), fields(id = %id, field = patch.field().as_str()))]
    async fn patch_item(&self, id: &ItemId, patch: ItemPatch) -> Result<Item, ServiceError> {
        let updated = self.item_repo.patch_field(id, &patch).await?.ok_or_else(|| not_found(id))?;
        info!("Item patched");
        Ok(updated)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_item(&self, id: &ItemId) -> Result<Item, ServiceError> {
        let removed = self.item_repo.delete(id).await?.ok_or_else(|| not_found(id))?;
        info!("Item deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::demo_catalog;
    use crate::repository::memory_store::MemoryStore;

    fn service(policy: PutPolicy) -> ItemServiceImpl {
        ItemServiceImpl::new(Arc::new(MemoryStore::with_records(demo_catalog())), policy)
    }

    #[tokio::test]
    async fn test_add_existing_id_leaves_record_untouched() {
        let service = service(PutPolicy::Upsert);
        let mut clash = demo_catalog().remove(0);
        clash.description = "Mallet".to_string();
        let result = service.add_item(clash).await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        let stored = service.get_item(&ItemId::Number(100)).await.unwrap();
        assert_eq!(stored.description, "Hammer");
    }

    #[tokio::test]
    async fn test_strict_put_on_missing_id_is_not_found() {
        let service = service(PutPolicy::Strict);
        let mut item = demo_catalog().remove(0);
        item.id = ItemId::Number(999);
        assert!(matches!(service.update_item(item).await, Err(ServiceError::NotFound(_))));
        assert_eq!(service.list_items().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_upsert_put_on_missing_id_creates() {
        let service = service(PutPolicy::Upsert);
        let mut item = demo_catalog().remove(0);
        item.id = ItemId::Text("new".to_string());
        let (_, outcome) = service.update_item(item).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);
        assert!(service.get_item(&ItemId::from("new")).await.is_ok());
    }

    #[tokio::test]
    async fn test_count_follows_inserts_and_deletes() {
        let service = service(PutPolicy::Upsert);
        assert_eq!(service.count_items().await.unwrap(), 4);
        service.delete_item(&ItemId::Number(103)).await.unwrap();
        assert_eq!(service.count_items().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_price_lookup_requires_matching_price() {
        let service = service(PutPolicy::Upsert);
        assert!(service.get_item_with_price(&ItemId::Number(102), 0.5).await.is_ok());
        assert!(service.get_item_with_price(&ItemId::Number(102), 0.6).await.is_err());
    }
}
