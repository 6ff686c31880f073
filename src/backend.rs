//! Opens the storage backend selected in the config.

use async_trait::async_trait;
use glucosnap_core::{FileStore, HealthStore, KeyValueStore, PersistenceGateway, StorageError};
use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::db::{init_db, SqliteStore, DATABASE_FILE};

/// Either of the durable backends, chosen at startup.
pub enum Backend {
    File(FileStore),
    Sqlite(SqliteStore),
}

#[async_trait]
impl KeyValueStore for Backend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Backend::File(store) => store.get(key).await,
            Backend::Sqlite(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Backend::File(store) => store.set(key, value).await,
            Backend::Sqlite(store) => store.set(key, value).await,
        }
    }
}

impl Backend {
    pub async fn open(config: &Config) -> Result<Self, sqlx::Error> {
        let data_dir = &config.data_dir.value;
        match config.storage.value {
            StorageBackend::File => {
                tracing::debug!(dir = %data_dir.display(), "using file storage");
                Ok(Backend::File(FileStore::new(data_dir.clone())))
            }
            StorageBackend::Sqlite => {
                let path = data_dir.join(DATABASE_FILE);
                tracing::debug!(path = %path.display(), "using sqlite storage");
                let pool = init_db(&path).await?;
                Ok(Backend::Sqlite(SqliteStore::new(pool)))
            }
        }
    }
}

/// Opens the backend and loads the Health Data Store from it.
pub async fn open_store(config: &Config) -> Result<HealthStore<Backend>, sqlx::Error> {
    let backend = Backend::open(config).await?;
    let gateway = Arc::new(PersistenceGateway::new(backend));
    Ok(HealthStore::open(gateway, config.user_settings()).await)
}
