//! Typed repositories over the document store.

use jobboard_models::job::fields;
use jobboard_models::{Job, JobChanges, JobFilterRequest, JobId, User, UserId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::job_query::build_job_filter;
use crate::sorting::SortSpec;
use crate::store::{collections, DocumentStore};

fn encode<T: Serialize>(value: &T) -> StoreResult<Value> {
    serde_json::to_value(value).map_err(|e| StoreError::SerializationError(e.to_string()))
}

fn decode<T: DeserializeOwned>(document: Value) -> StoreResult<T> {
    serde_json::from_value(document).map_err(|e| StoreError::InvalidResponse(e.to_string()))
}

fn by_id(id: &str) -> Filter {
    Filter::eq(fields::ID, id)
}

/// Job postings.
#[derive(Debug, Clone)]
pub struct JobRepository {
    store: DocumentStore,
}

impl JobRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, job: &Job) -> StoreResult<()> {
        self.store.insert_one(collections::JOBS, encode(job)?).await?;
        info!(job_id = %job.id, title = %job.title, "Created job");
        Ok(())
    }

    pub async fn get(&self, id: &JobId) -> StoreResult<Option<Job>> {
        self.store
            .find_one(collections::JOBS, &by_id(id.as_str()))
            .await?
            .map(decode)
            .transpose()
    }

    /// Published jobs matching `request`, newest first.
    pub async fn list(&self, request: &JobFilterRequest) -> StoreResult<Vec<Job>> {
        let filter = build_job_filter(request);
        let documents = self
            .store
            .find(collections::JOBS, &filter, Some(&SortSpec::newest_first()), None)
            .await?;
        debug!(count = documents.len(), "Listed jobs");
        documents.into_iter().map(decode).collect()
    }

    /// `$set` only the fields carried by `changes`. Returns `false` if the
    /// job does not exist.
    pub async fn update(&self, id: &JobId, changes: &JobChanges) -> StoreResult<bool> {
        let matched = self
            .store
            .update_one(collections::JOBS, &by_id(id.as_str()), encode(changes)?)
            .await?;
        Ok(matched > 0)
    }

    /// Returns `false` if nothing was deleted.
    pub async fn delete(&self, id: &JobId) -> StoreResult<bool> {
        let deleted = self
            .store
            .delete_one(collections::JOBS, &by_id(id.as_str()))
            .await?;
        if deleted > 0 {
            info!(job_id = %id, "Deleted job");
        }
        Ok(deleted > 0)
    }
}

/// Registered users.
#[derive(Debug, Clone)]
pub struct UserRepository {
    store: DocumentStore,
}

impl UserRepository {
    const EMAIL: &'static str = "email";

    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, user: &User) -> StoreResult<()> {
        self.store.insert_one(collections::USERS, encode(user)?).await?;
        info!(user_id = %user.id, role = user.role.as_str(), "Created user");
        Ok(())
    }

    /// Exact match on the stored (already normalized) email.
    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.store
            .find_one(collections::USERS, &Filter::eq(Self::EMAIL, email))
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn get(&self, id: &UserId) -> StoreResult<Option<User>> {
        self.store
            .find_one(collections::USERS, &by_id(id.as_str()))
            .await?
            .map(decode)
            .transpose()
    }
}
