//! Data API wire types.
//!
//! Every action is a `POST {base}/action/{name}` whose body names the data
//! source, database and collection plus action-specific fields. Documents,
//! filters and sort specs travel as plain JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Target collection, shared by every request body.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub data_source: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindRequest {
    #[serde(flatten)]
    pub namespace: Namespace,
    pub filter: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FindOneRequest {
    #[serde(flatten)]
    pub namespace: Namespace,
    pub filter: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertOneRequest {
    #[serde(flatten)]
    pub namespace: Namespace,
    pub document: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateOneRequest {
    #[serde(flatten)]
    pub namespace: Namespace,
    pub filter: Value,
    pub update: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteOneRequest {
    #[serde(flatten)]
    pub namespace: Namespace,
    pub filter: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FindResponse {
    #[serde(default)]
    pub documents: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FindOneResponse {
    #[serde(default)]
    pub document: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResponse {
    pub inserted_id: Value,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOneResponse {
    pub matched_count: u64,
    #[serde(default)]
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOneResponse {
    pub deleted_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ns() -> Namespace {
        Namespace {
            data_source: "Cluster0".into(),
            database: "jobapp".into(),
            collection: "jobs".into(),
        }
    }

    #[test]
    fn test_find_request_flattens_namespace() {
        let body = serde_json::to_value(FindRequest {
            namespace: ns(),
            filter: json!({ "isPublished": { "$eq": true } }),
            sort: Some(json!({ "createdAt": -1 })),
            limit: None,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "dataSource": "Cluster0",
                "database": "jobapp",
                "collection": "jobs",
                "filter": { "isPublished": { "$eq": true } },
                "sort": { "createdAt": -1 }
            })
        );
    }

    #[test]
    fn test_find_one_response_null_document() {
        let resp: FindOneResponse = serde_json::from_value(json!({ "document": null })).unwrap();
        assert!(resp.document.is_none());
    }

    #[test]
    fn test_counts_deserialize() {
        let update: UpdateOneResponse =
            serde_json::from_value(json!({ "matchedCount": 1, "modifiedCount": 0 })).unwrap();
        assert_eq!(update.matched_count, 1);
        let delete: DeleteOneResponse = serde_json::from_value(json!({ "deletedCount": 0 })).unwrap();
        assert_eq!(delete.deleted_count, 0);
    }
}
