//! Job listing filters.
//!
//! Query parameters arrive as loosely-typed strings. [`JobListQuery`] is the
//! raw shape the HTTP layer deserializes; [`JobFilterRequest`] is the typed
//! form the query builder consumes, with numbers parsed and flags decided.

use serde::{Deserialize, Serialize};

/// Raw job listing query parameters, exactly as received.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    pub search: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub min_salary: Option<String>,
    pub max_salary: Option<String>,
    pub remote: Option<String>,
}

/// Typed job listing filter. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilterRequest {
    pub search: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    /// Set only by the literal string `"true"`.
    pub remote: bool,
}

impl From<JobListQuery> for JobFilterRequest {
    fn from(query: JobListQuery) -> Self {
        Self {
            search: query.search,
            job_type: query.job_type,
            location: query.location,
            min_salary: parse_salary(query.min_salary.as_deref()),
            max_salary: parse_salary(query.max_salary.as_deref()),
            remote: query.remote.as_deref() == Some("true"),
        }
    }
}

/// Parse a salary bound. Blank, unparseable and non-finite values are
/// treated as not provided.
pub fn parse_salary(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
