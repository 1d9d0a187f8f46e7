//! Backend selection.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::info;

use crate::client::{DataApiClient, DataApiConfig};
use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::memory::MemoryStore;
use crate::sorting::SortSpec;

/// Collection names.
pub mod collections {
    pub const JOBS: &str = "jobs";
    pub const USERS: &str = "users";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    DataApi,
}

impl FromStr for StoreBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "data-api" | "data_api" | "dataapi" => Ok(Self::DataApi),
            other => Err(StoreError::config(format!(
                "unknown STORE_BACKEND '{other}' (expected 'memory' or 'data-api')"
            ))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::DataApi => "data-api",
        })
    }
}

#[derive(Debug, Clone)]
pub enum StoreConfig {
    Memory,
    DataApi(DataApiConfig),
}

impl StoreConfig {
    /// Read `STORE_BACKEND` and, for `data-api`, the `DATA_API_*` variables.
    pub fn from_env() -> StoreResult<Self> {
        let backend = match std::env::var("STORE_BACKEND") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => StoreBackend::default(),
        };
        match backend {
            StoreBackend::Memory => Ok(Self::Memory),
            StoreBackend::DataApi => Ok(Self::DataApi(DataApiConfig::from_env()?)),
        }
    }

    pub fn backend(&self) -> StoreBackend {
        match self {
            Self::Memory => StoreBackend::Memory,
            Self::DataApi(_) => StoreBackend::DataApi,
        }
    }
}

/// Document store handle. Cheap to clone.
#[derive(Debug, Clone)]
pub enum DocumentStore {
    DataApi(DataApiClient),
    Memory(MemoryStore),
}

impl DocumentStore {
    pub fn connect(config: StoreConfig) -> StoreResult<Self> {
        let store = match config {
            StoreConfig::Memory => Self::memory(),
            StoreConfig::DataApi(config) => Self::DataApi(DataApiClient::new(config)?),
        };
        info!(backend = %store.backend(), "Document store ready");
        Ok(store)
    }

    pub fn from_env() -> StoreResult<Self> {
        Self::connect(StoreConfig::from_env()?)
    }

    /// In-memory store with the same unique constraints as the hosted
    /// database (`users.email`).
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new().with_unique_field(collections::USERS, "email"))
    }

    pub fn backend(&self) -> StoreBackend {
        match self {
            Self::DataApi(_) => StoreBackend::DataApi,
            Self::Memory(_) => StoreBackend::Memory,
        }
    }

    pub async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&SortSpec>,
        limit: Option<u64>,
    ) -> StoreResult<Vec<Value>> {
        match self {
            Self::DataApi(c) => c.find(collection, filter, sort, limit).await,
            Self::Memory(m) => m.find(collection, filter, sort, limit).await,
        }
    }

    pub async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Value>> {
        match self {
            Self::DataApi(c) => c.find_one(collection, filter).await,
            Self::Memory(m) => m.find_one(collection, filter).await,
        }
    }

    pub async fn insert_one(&self, collection: &str, document: Value) -> StoreResult<()> {
        match self {
            Self::DataApi(c) => c.insert_one(collection, document).await,
            Self::Memory(m) => m.insert_one(collection, document).await,
        }
    }

    pub async fn update_one(&self, collection: &str, filter: &Filter, fields: Value) -> StoreResult<u64> {
        match self {
            Self::DataApi(c) => c.update_one(collection, filter, fields).await,
            Self::Memory(m) => m.update_one(collection, filter, fields).await,
        }
    }

    pub async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        match self {
            Self::DataApi(c) => c.delete_one(collection, filter).await,
            Self::Memory(m) => m.delete_one(collection, filter).await,
        }
    }

    pub async fn ping(&self) -> StoreResult<()> {
        match self {
            Self::DataApi(c) => c.ping(collections::JOBS).await,
            Self::Memory(m) => m.ping().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!(" Data-API ".parse::<StoreBackend>().unwrap(), StoreBackend::DataApi);
        assert!("postgres".parse::<StoreBackend>().is_err());
    }

    #[test]
    #[serial]
    fn test_config_defaults_to_memory() {
        std::env::remove_var("STORE_BACKEND");
        let config = StoreConfig::from_env().unwrap();
        assert_eq!(config.backend(), StoreBackend::Memory);
    }

    #[test]
    #[serial]
    fn test_data_api_requires_url_and_key() {
        std::env::set_var("STORE_BACKEND", "data-api");
        std::env::remove_var("DATA_API_URL");
        std::env::remove_var("DATA_API_KEY");
        let result = StoreConfig::from_env();
        assert!(matches!(result, Err(StoreError::Config(_))));
        std::env::remove_var("STORE_BACKEND");
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = DocumentStore::memory();
        store
            .insert_one(collections::JOBS, serde_json::json!({ "_id": "1", "title": "x" }))
            .await
            .unwrap();
        assert!(store.ping().await.is_ok());
        let found = store.find_one(collections::JOBS, &Filter::eq("_id", "1")).await.unwrap();
        assert!(found.is_some());
    }
}
