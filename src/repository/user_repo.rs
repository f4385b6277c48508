use async_trait::async_trait;

use crate::model::user::User;
use crate::repository::record::RecordStore;
use crate::repository::repository_error::RepositoryResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    /// Fails with `AlreadyExists` when the email is registered
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn list_all(&self) -> RepositoryResult<Vec<User>>;
    async fn count(&self) -> RepositoryResult<usize>;
}

#[async_trait]
impl<S> UserRepository for S
where
    S: RecordStore<User>,
{
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        RecordStore::find(self, email).await
    }

    async fn insert(&self, user: User) -> RepositoryResult<User> {
        RecordStore::insert(self, user).await
    }

    async fn list_all(&self) -> RepositoryResult<Vec<User>> {
        RecordStore::list_all(self).await
    }

    async fn count(&self) -> RepositoryResult<usize> {
        RecordStore::count(self).await
    }
}
