pub mod item_repo;
pub mod json_file_store;
pub mod memory_store;
pub mod mongo_store;
pub mod record;
pub mod redis_store;
pub mod repository_error;
pub mod user_repo;

pub use item_repo::ItemRepository;
pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use mongo_store::MongoStore;
pub use record::{Record, RecordStore, UpsertOutcome};
pub use redis_store::RedisStore;
pub use repository_error::{RepositoryError, RepositoryResult};
pub use user_repo::UserRepository;
