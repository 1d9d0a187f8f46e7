//! Data API client.
//!
//! Talks to a Mongo Data API compatible HTTP endpoint:
//! - pooled `reqwest` client with request and connect timeouts
//! - `api-key` header authentication
//! - retry with backoff on network errors, 429 and 5xx
//! - a tracing span and metrics per request

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info_span, Instrument};

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::metrics::record_request;
use crate::retry::{with_retry, RetryConfig};
use crate::sorting::SortSpec;
use crate::types::{
    DeleteOneRequest, DeleteOneResponse, FindOneRequest, FindOneResponse, FindRequest,
    FindResponse, InsertOneRequest, InsertOneResponse, Namespace, UpdateOneRequest,
    UpdateOneResponse,
};

const BACKEND: &str = "data-api";

/// Marker the server uses for unique index violations.
const DUPLICATE_KEY_MARKER: &str = "E11000";

#[derive(Debug, Clone)]
pub struct DataApiConfig {
    /// Endpoint root, e.g. `https://data.example.com/app/<app-id>/endpoint/data/v1`.
    pub base_url: String,
    pub api_key: String,
    pub data_source: String,
    pub database: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryConfig,
}

impl DataApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        let base_url = required_env("DATA_API_URL")?;
        let api_key = required_env("DATA_API_KEY")?;

        let timeout_secs: u64 = std::env::var("DATA_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);
        let connect_timeout_secs: u64 = std::env::var("DATA_API_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            data_source: std::env::var("DATA_API_DATA_SOURCE")
                .unwrap_or_else(|_| "Cluster0".to_string()),
            database: std::env::var("DATA_API_DATABASE").unwrap_or_else(|_| "jobapp".to_string()),
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
        })
    }
}

fn required_env(key: &str) -> StoreResult<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(StoreError::config(format!(
            "{key} must be set when STORE_BACKEND=data-api"
        ))),
    }
}

/// HTTP document store client.
#[derive(Clone)]
pub struct DataApiClient {
    http: Client,
    config: DataApiConfig,
}

impl std::fmt::Debug for DataApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataApiClient")
            .field("base_url", &self.config.base_url)
            .field("data_source", &self.config.data_source)
            .field("database", &self.config.database)
            .finish_non_exhaustive()
    }
}

impl DataApiClient {
    pub fn new(config: DataApiConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("jobboard-store/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Network)?;

        Ok(Self { http, config })
    }

    pub fn from_env() -> StoreResult<Self> {
        Self::new(DataApiConfig::from_env()?)
    }

    pub fn config(&self) -> &DataApiConfig {
        &self.config
    }

    fn namespace(&self, collection: &str) -> Namespace {
        Namespace {
            data_source: self.config.data_source.clone(),
            database: self.config.database.clone(),
            collection: collection.to_string(),
        }
    }

    pub async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&SortSpec>,
        limit: Option<u64>,
    ) -> StoreResult<Vec<Value>> {
        let body = FindRequest {
            namespace: self.namespace(collection),
            filter: filter.to_document(),
            sort: sort.map(SortSpec::to_document),
            limit,
        };
        let response: FindResponse = self.action("find", collection, &body).await?;
        debug!(collection, count = response.documents.len(), "find completed");
        Ok(response.documents)
    }

    pub async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Value>> {
        let body = FindOneRequest {
            namespace: self.namespace(collection),
            filter: filter.to_document(),
        };
        let response: FindOneResponse = self.action("findOne", collection, &body).await?;
        Ok(response.document.filter(|doc| !doc.is_null()))
    }

    pub async fn insert_one(&self, collection: &str, document: Value) -> StoreResult<()> {
        let body = InsertOneRequest {
            namespace: self.namespace(collection),
            document,
        };
        let response: InsertOneResponse = self.action("insertOne", collection, &body).await?;
        debug!(collection, inserted_id = %response.inserted_id, "document inserted");
        Ok(())
    }

    /// Apply `{"$set": fields}` to the first match. Returns the matched count.
    pub async fn update_one(&self, collection: &str, filter: &Filter, fields: Value) -> StoreResult<u64> {
        let body = UpdateOneRequest {
            namespace: self.namespace(collection),
            filter: filter.to_document(),
            update: json!({ "$set": fields }),
        };
        let response: UpdateOneResponse = self.action("updateOne", collection, &body).await?;
        Ok(response.matched_count)
    }

    /// Returns the deleted count.
    pub async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let body = DeleteOneRequest {
            namespace: self.namespace(collection),
            filter: filter.to_document(),
        };
        let response: DeleteOneResponse = self.action("deleteOne", collection, &body).await?;
        Ok(response.deleted_count)
    }

    /// Cheap round trip used by readiness checks.
    pub async fn ping(&self, collection: &str) -> StoreResult<()> {
        self.find_one(collection, &Filter::all()).await.map(|_| ())
    }

    async fn action<B, R>(&self, action: &'static str, collection: &str, body: &B) -> StoreResult<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}/action/{}", self.config.base_url, action);
        let payload = serde_json::to_vec(body)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        let url = url.as_str();
        let payload = payload.as_slice();
        self.execute_request(
            action,
            collection,
            with_retry(&self.config.retry, action, move || self.send(url, payload)),
        )
        .await
    }

    async fn send<R: DeserializeOwned>(&self, url: &str, payload: &[u8]) -> StoreResult<R> {
        let response = self
            .http
            .post(url)
            .header("api-key", &self.config.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, url, response).await);
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::InvalidResponse(format!("{url}: {e}")))
    }

    async fn execute_request<T, F>(&self, operation: &str, collection: &str, fut: F) -> StoreResult<T>
    where
        F: std::future::Future<Output = StoreResult<T>>,
    {
        let span = info_span!("store_request", backend = BACKEND, operation = %operation, collection = %collection);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(BACKEND, operation, status, start.elapsed().as_secs_f64());

        result
    }

    async fn handle_error_response(status: StatusCode, url: &str, response: Response) -> StoreError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(secs) = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
            {
                return StoreError::RateLimited(secs.saturating_mul(1000));
            }
        }

        let body = response.text().await.unwrap_or_default();
        if body.contains(DUPLICATE_KEY_MARKER) {
            return StoreError::AlreadyExists(body);
        }
        StoreError::from_http_status(status.as_u16(), format!("{url} failed: {body}"))
    }
}
