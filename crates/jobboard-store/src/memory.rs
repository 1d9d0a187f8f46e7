//! In-process document store.
//!
//! Collections are vectors of JSON documents keyed by collection name.
//! Filters run through [`Filter::matcher`], so results match what the Data
//! API returns for the same filter. Unique fields stand in for the unique
//! indexes the hosted database enforces.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::sorting::SortSpec;

const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Value>>>>,
    unique: Arc<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject inserts into `collection` whose `field` equals that of an
    /// existing document. Call before the store is shared.
    pub fn with_unique_field(mut self, collection: &str, field: &str) -> Self {
        Arc::make_mut(&mut self.unique)
            .entry(collection.to_string())
            .or_default()
            .push(field.to_string());
        self
    }

    pub async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&SortSpec>,
        limit: Option<u64>,
    ) -> StoreResult<Vec<Value>> {
        let matcher = filter.matcher()?;
        let collections = self.collections.read().await;

        let mut documents: Vec<Value> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matcher.matches(d)).cloned().collect())
            .unwrap_or_default();
        drop(collections);

        if let Some(sort) = sort {
            documents.sort_by(|a, b| sort.compare(a, b));
        }
        if let Some(limit) = limit {
            documents.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(documents)
    }

    pub async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Value>> {
        let matcher = filter.matcher()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matcher.matches(d)))
            .cloned())
    }

    /// Insert a document. Fails if another document has the same `_id` or
    /// the same value in one of the collection's unique fields.
    pub async fn insert_one(&self, collection: &str, document: Value) -> StoreResult<()> {
        if !document.is_object() {
            return Err(StoreError::SerializationError(
                "document must be a JSON object".to_string(),
            ));
        }

        let unique = self.unique.get(collection).map(Vec::as_slice).unwrap_or_default();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        for field in std::iter::once(ID_FIELD).chain(unique.iter().map(String::as_str)) {
            let Some(value) = document.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            if docs.iter().any(|d| d.get(field) == Some(value)) {
                return Err(StoreError::AlreadyExists(format!("{collection}.{field} = {value}")));
            }
        }
        docs.push(document);
        Ok(())
    }

    /// Apply `fields` as a `$set` to the first match. Dotted keys address
    /// nested fields. Returns the matched count.
    pub async fn update_one(&self, collection: &str, filter: &Filter, fields: Value) -> StoreResult<u64> {
        let Value::Object(fields) = fields else {
            return Err(StoreError::SerializationError(
                "$set payload must be a JSON object".to_string(),
            ));
        };

        let matcher = filter.matcher()?;
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| matcher.matches(d)))
        else {
            return Ok(0);
        };

        for (path, value) in fields {
            set_path(doc, &path, value);
        }
        Ok(1)
    }

    /// Returns the deleted count.
    pub async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let matcher = filter.matcher()?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| matcher.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    pub async fn ping(&self) -> StoreResult<()> {
        let _guard = self.collections.read().await;
        Ok(())
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn set_path(doc: &mut Value, path: &str, value: Value) {
    if !doc.is_object() {
        *doc = Value::Object(Map::new());
    }
    let Some(map) = doc.as_object_mut() else {
        return;
    };
    match path.split_once('.') {
        Some((head, rest)) => {
            set_path(map.entry(head.to_string()).or_insert(Value::Null), rest, value)
        }
        None => {
            map.insert(path.to_string(), value);
        }
    }
}
