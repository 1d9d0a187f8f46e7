//! Job posting models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{ModelError, ModelResult};
use crate::user::UserId;
use crate::utils::slugify;

/// Stored field names of a job document.
///
/// Filters and sorts are built against these paths, so they must match the
/// serde names on [`Job`].
pub mod fields {
    pub const ID: &str = "_id";
    pub const TITLE: &str = "title";
    pub const COMPANY_NAME: &str = "companyName";
    pub const LOCATION: &str = "location";
    pub const LOCATIONS: &str = "locations";
    pub const JOB_TYPE: &str = "jobType";
    pub const DESCRIPTION: &str = "description";
    pub const REQUIREMENTS: &str = "requirements";
    pub const RESPONSIBILITIES: &str = "responsibilities";
    pub const SALARY_MIN: &str = "salaryRange.min";
    pub const SALARY_MAX: &str = "salaryRange.max";
    pub const IS_PUBLISHED: &str = "isPublished";
    pub const CREATED_AT: &str = "createdAt";
}

/// Unique identifier for a job posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse a client-supplied ID, rejecting anything that is not a UUID.
    pub fn parse(s: &str) -> ModelResult<Self> {
        Uuid::parse_str(s)
            .map(|id| Self(id.to_string()))
            .map_err(|_| ModelError::InvalidId(s.to_string()))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Employment type of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Contract")]
    Contract,
    #[serde(rename = "Internship")]
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Internship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Internship => "Internship",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = ModelError;

    /// Exact match on the stored spelling; listing filters use the
    /// separator-tolerant pattern instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| ModelError::InvalidJobType(s.to_string()))
    }
}

/// Pay period of a salary range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SalaryPeriod {
    #[default]
    PerMonth,
    PerYear,
    PerAnnum,
    PerHour,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// Salary range of a posting. A missing bound means unbounded on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[validate(schema(function = "validate_salary_bounds"))]
pub struct SalaryRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub max: Option<f64>,
    #[serde(default = "default_currency")]
    #[validate(length(min = 1, max = 8))]
    pub currency: String,
    #[serde(default)]
    pub period: SalaryPeriod,
}

impl Default for SalaryRange {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            currency: default_currency(),
            period: SalaryPeriod::default(),
        }
    }
}

fn validate_salary_bounds(range: &SalaryRange) -> Result<(), ValidationError> {
    match (range.min, range.max) {
        (Some(min), Some(max)) if min > max => {
            Err(ValidationError::new("salary_min_exceeds_max"))
        }
        _ => Ok(()),
    }
}

fn default_published() -> bool {
    true
}

/// A job posting as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: JobId,

    pub title: String,

    pub company_name: String,

    /// Primary location, kept alongside `locations` for older clients.
    pub location: String,

    #[serde(default)]
    pub locations: Vec<String>,

    pub job_type: JobType,

    #[serde(default)]
    pub salary_range: SalaryRange,

    pub description: String,

    #[serde(default)]
    pub requirements: Vec<String>,

    #[serde(default)]
    pub responsibilities: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<DateTime<Utc>>,

    #[serde(default = "default_published")]
    pub is_published: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default)]
    pub views: u64,

    #[serde(default)]
    pub applicants_count: u64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a job.
///
/// Required fields are optional here so that a missing field becomes a
/// domain error with a readable message rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 200))]
    pub company_name: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    pub job_type: Option<String>,
    pub salary_range: Option<SalaryRange>,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn trimmed_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl NewJob {
    /// Turn the payload into a stored job owned by `created_by`.
    pub fn into_job(self, created_by: Option<UserId>) -> ModelResult<Job> {
        self.validate()
            .map_err(|e| ModelError::Validation(e.to_string()))?;
        if let Some(range) = &self.salary_range {
            range
                .validate()
                .map_err(|e| ModelError::Validation(e.to_string()))?;
        }

        let missing = || ModelError::MissingField("Required fields are missing.".to_string());
        let title = required(self.title).ok_or_else(missing)?;
        let company_name = required(self.company_name).ok_or_else(missing)?;
        let job_type = required(self.job_type).ok_or_else(missing)?;
        let description = required(self.description).ok_or_else(missing)?;
        let job_type: JobType = job_type.parse()?;

        let location = required(self.location);
        let locations = trimmed_list(self.locations);
        let (location, locations) = match (location, locations.is_empty()) {
            (Some(primary), true) => (primary.clone(), vec![primary]),
            (Some(primary), false) => (primary, locations),
            (None, false) => (locations[0].clone(), locations),
            (None, true) => {
                return Err(ModelError::MissingField(
                    "At least one location is required.".to_string(),
                ))
            }
        };

        let id = JobId::new();
        let slug = Some(format!("{}-{}", slugify(&title), &id.as_str()[..8]));
        let now = Utc::now();

        Ok(Job {
            id,
            title,
            company_name,
            location,
            locations,
            job_type,
            salary_range: self.salary_range.unwrap_or_default(),
            description,
            requirements: trimmed_list(self.requirements),
            responsibilities: trimmed_list(self.responsibilities),
            application_deadline: self.application_deadline,
            is_published: self.is_published.unwrap_or(true),
            created_by,
            slug,
            views: 0,
            applicants_count: 0,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Whitelisted partial update of a job. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub company_name: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub salary_range: Option<SalaryRange>,
    #[validate(length(min = 1, max = 20000))]
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub responsibilities: Option<Vec<String>>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
}

/// Validated, normalized fields of a [`JobUpdate`].
///
/// Serializes to the supplied fields plus `updatedAt` and nothing else, so it
/// can be sent as a `$set` without touching counters or fields another
/// writer changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<SalaryRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl JobUpdate {
    /// Validate every supplied field. Nothing is returned if any is invalid.
    pub fn into_changes(self) -> ModelResult<JobChanges> {
        self.validate()
            .map_err(|e| ModelError::Validation(e.to_string()))?;
        if let Some(range) = &self.salary_range {
            range
                .validate()
                .map_err(|e| ModelError::Validation(e.to_string()))?;
        }
        let job_type = self
            .job_type
            .as_deref()
            .map(str::parse::<JobType>)
            .transpose()?;
        let trim = |v: String| v.trim().to_string();

        Ok(JobChanges {
            title: self.title.map(trim),
            company_name: self.company_name.map(trim),
            location: self.location.map(trim),
            job_type,
            salary_range: self.salary_range,
            description: self.description.map(trim),
            requirements: self.requirements.map(trimmed_list),
            responsibilities: self.responsibilities.map(trimmed_list),
            application_deadline: self.application_deadline,
            is_published: self.is_published,
            updated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_job() -> NewJob {
        NewJob {
            title: Some("Rust Engineer".to_string()),
            company_name: Some("Acme".to_string()),
            location: Some("Pune".to_string()),
            job_type: Some("Full-time".to_string()),
            description: Some("Build things".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_job_type_round_trip() {
        assert_eq!("Part-time".parse::<JobType>().unwrap(), JobType::PartTime);
        assert_eq!(
            serde_json::to_value(JobType::FullTime).unwrap(),
            serde_json::json!("Full-time")
        );
        assert!("full time".parse::<JobType>().is_err());
    }

    #[test]
    fn test_job_id_parse() {
        let id = JobId::new();
        assert_eq!(JobId::parse(id.as_str()).unwrap(), id);
        assert!(JobId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_new_job_fills_locations() {
        let job = new_job().into_job(None).unwrap();
        assert_eq!(job.location, "Pune");
        assert_eq!(job.locations, vec!["Pune".to_string()]);
        assert!(job.is_published);
        assert!(job.slug.unwrap().starts_with("rust-engineer-"));
    }

    #[test]
    fn test_new_job_primary_from_locations() {
        let mut payload = new_job();
        payload.location = None;
        payload.locations = vec!["Delhi".to_string(), "Remote".to_string()];
        let job = payload.into_job(None).unwrap();
        assert_eq!(job.location, "Delhi");
        assert_eq!(job.locations.len(), 2);
    }

    #[test]
    fn test_new_job_requires_fields() {
        let mut payload = new_job();
        payload.title = Some("   ".to_string());
        assert_eq!(
            payload.into_job(None).unwrap_err(),
            ModelError::MissingField("Required fields are missing.".to_string())
        );

        let mut payload = new_job();
        payload.location = None;
        assert_eq!(
            payload.into_job(None).unwrap_err(),
            ModelError::MissingField("At least one location is required.".to_string())
        );
    }

    #[test]
    fn test_new_job_rejects_unknown_type() {
        let mut payload = new_job();
        payload.job_type = Some("Freelance".to_string());
        assert!(matches!(
            payload.into_job(None),
            Err(ModelError::InvalidJobType(_))
        ));
    }

    #[test]
    fn test_salary_bounds_validation() {
        let mut payload = new_job();
        payload.salary_range = Some(SalaryRange {
            min: Some(80.0),
            max: Some(50.0),
            ..Default::default()
        });
        assert!(matches!(
            payload.into_job(None),
            Err(ModelError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_salary_bounds_are_not_serialized() {
        let job = new_job().into_job(None).unwrap();
        let value = serde_json::to_value(&job).unwrap();
        let range = value.get("salaryRange").unwrap();
        assert!(range.get("min").is_none());
        assert!(range.get("max").is_none());
        assert_eq!(range.get("currency").unwrap(), "INR");
        assert_eq!(range.get("period").unwrap(), "per_month");
        assert!(value.get("_id").is_some());
    }

    #[test]
    fn test_update_keeps_only_supplied_fields() {
        let update: JobUpdate = serde_json::from_value(serde_json::json!({
            "title": "  Senior Rust Engineer ",
            "jobType": "Contract",
            "views": 999,
            "isPublished": false
        }))
        .unwrap();
        let changes = update.into_changes().unwrap();
        assert_eq!(changes.title.as_deref(), Some("Senior Rust Engineer"));
        assert_eq!(changes.job_type, Some(JobType::Contract));
        assert_eq!(changes.is_published, Some(false));

        let value = serde_json::to_value(&changes).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["isPublished", "jobType", "title", "updatedAt"]);
        assert_eq!(value["jobType"], "Contract");
    }

    #[test]
    fn test_update_rejects_invalid_fields() {
        let update = JobUpdate {
            title: Some("Changed".to_string()),
            job_type: Some("Gig".to_string()),
            ..Default::default()
        };
        assert!(update.into_changes().is_err());

        let update = JobUpdate {
            salary_range: Some(SalaryRange {
                min: Some(90.0),
                max: Some(10.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(update.into_changes(), Err(ModelError::Validation(_))));
    }
}
