use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::{AppConfig, ConfigError, JwtConfig, MongoConfig, RedisConfig, StorageBackend, StorageConfig};
use crate::handler::http_handler::hostname;
use crate::model::item::{demo_catalog, Item};
use crate::model::user::User;
use crate::repository::item_repo::ItemRepository;
use crate::repository::mongo_store::{self, MongoStore};
use crate::repository::repository_error::RepositoryError;
use crate::repository::user_repo::UserRepository;
use crate::repository::{JsonFileStore, MemoryStore, RedisStore};
use crate::router::create_router;
use crate::service::item_service::{ItemService, ItemServiceImpl};
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::redis::{RedisError, RedisService};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
    #[error("redis error: {0}")]
    Redis(#[from] RedisError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot resolve listen address {0}")]
    Address(String),
}

pub type Stores = (Arc<dyn ItemRepository>, Arc<dyn UserRepository>);

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    /// Loads configuration, connects the selected backend and builds the router
    pub async fn new() -> Result<Self, AppError> {
        let config = AppConfig::from_env()?;
        let storage = StorageConfig::from_env()?;
        let jwt_config = JwtConfig::from_env()?;

        let (item_repo, user_repo) = Self::build_stores(config.backend, &storage).await?;
        let item_service: Arc<dyn ItemService> = Arc::new(ItemServiceImpl::new(item_repo, config.put_policy));
        let user_service: Arc<dyn UserService> =
            Arc::new(UserServiceImpl::new(user_repo, Arc::new(JwtTokenUtilsImpl::new(jwt_config))));

        let router = create_router(item_service, user_service);
        Ok(App { config, router })
    }

    pub async fn build_stores(backend: StorageBackend, storage: &StorageConfig) -> Result<Stores, AppError> {
        info!("Using {} storage backend", backend);
        let stores: Stores = match backend {
            StorageBackend::Memory => {
                let items = if storage.seed_items {
                    info!("Seeding in-memory catalog with demo items");
                    MemoryStore::with_records(demo_catalog())
                } else {
                    MemoryStore::new()
                };
                let items: Arc<dyn ItemRepository> = Arc::new(items);
                let users: Arc<dyn UserRepository> = Arc::new(MemoryStore::<User>::new());
                (items, users)
            }
            StorageBackend::File => {
                if storage.seed_items {
                    warn!("FAKEAPI_SEED only applies to the memory backend, ignoring it");
                }
                let items: Arc<dyn ItemRepository> = Arc::new(JsonFileStore::<Item>::new(&storage.item_file));
                let users: Arc<dyn UserRepository> = Arc::new(JsonFileStore::<User>::new(&storage.user_file));
                (items, users)
            }
            StorageBackend::Redis => {
                let redis = RedisService::new(RedisConfig::from_env()?).await?;
                let items: Arc<dyn ItemRepository> = Arc::new(RedisStore::<Item>::new(redis.clone()));
                let users: Arc<dyn UserRepository> = Arc::new(RedisStore::<User>::new(redis));
                (items, users)
            }
            StorageBackend::Mongo => {
                let mongo_config = MongoConfig::from_env()?;
                let client = mongo_store::connect(&mongo_config).await?;
                let items: Arc<dyn ItemRepository> = Arc::new(
                    MongoStore::<Item>::new(&client, &mongo_config.database, &mongo_config.item_collection).await?,
                );
                let users: Arc<dyn UserRepository> = Arc::new(
                    MongoStore::<User>::new(&client, &mongo_config.database, &mongo_config.user_collection).await?,
                );
                (items, users)
            }
        };
        Ok(stores)
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn start(self) -> Result<(), AppError> {
        let endpoint = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = tokio::net::lookup_host(&endpoint)
            .await?
            .next()
            .ok_or_else(|| AppError::Address(endpoint.clone()))?;

        info!("Hostname: {}", hostname());
        match self.config.tls_paths() {
            Some((cert, key)) => {
                let tls = RustlsConfig::from_pem_file(cert, key).await.map_err(|e| {
                    error!("Failed to load TLS certificate {} / key {}: {}", cert.display(), key.display(), e);
                    e
                })?;
                info!("Server running at https://{} (backend: {})", addr, self.config.backend);
                let handle = axum_server::Handle::new();
                tokio::spawn(shutdown_on_ctrl_c(handle.clone()));
                axum_server::bind_rustls(addr, tls)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await?;
            }
            None => {
                info!("Server running at http://{} (backend: {}, HTTPS off)", addr, self.config.backend);
                let listener = tokio::net::TcpListener::bind(addr).await?;
                axum::serve(listener, self.router)
                    .with_graceful_shutdown(async {
                        if tokio::signal::ctrl_c().await.is_ok() {
                            info!("Shutdown signal received");
                        }
                    })
                    .await?;
            }
        }
        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_on_ctrl_c(handle: axum_server::Handle) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
        handle.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_memory_backend() {
        let storage = StorageConfig { seed_items: true, ..StorageConfig::default() };
        let (items, users) = App::build_stores(StorageBackend::Memory, &storage).await.unwrap();
        assert_eq!(items.count().await.unwrap(), 4);
        assert_eq!(users.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_backend_starts_empty_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            item_file: dir.path().join("data.json"),
            user_file: dir.path().join("users.json"),
            seed_items: false,
        };
        let (items, _) = App::build_stores(StorageBackend::File, &storage).await.unwrap();
        assert_eq!(items.list_all().await.unwrap().len(), 0);
    }
}
