//! Job listing filter construction.
//!
//! Turns a typed [`JobFilterRequest`] into a [`Filter`] over job documents.
//! Pure and infallible: malformed input degrades to "no constraint".

use jobboard_models::job::fields;
use jobboard_models::JobFilterRequest;

use crate::filter::Filter;
use crate::pattern::Pattern;

/// Fields searched by the free-text `search` parameter.
pub const SEARCH_FIELDS: [&str; 5] = [
    fields::TITLE,
    fields::COMPANY_NAME,
    fields::DESCRIPTION,
    fields::LOCATION,
    fields::JOB_TYPE,
];

/// Substring that marks a remote location.
const REMOTE_MARKER: &str = "remote";

/// Build the listing filter: published jobs matching every supplied clause.
pub fn build_job_filter(request: &JobFilterRequest) -> Filter {
    let mut clauses = vec![Filter::eq(fields::IS_PUBLISHED, true)];

    clauses.extend(search_clause(request.search.as_deref()));
    clauses.extend(
        request
            .job_type
            .as_deref()
            .and_then(Pattern::separator_tolerant)
            .map(|p| Filter::regex(fields::JOB_TYPE, p)),
    );
    clauses.extend(location_clause(request));
    clauses.extend(salary_clause(request.min_salary, request.max_salary));

    Filter::and(clauses)
}

fn search_clause(search: Option<&str>) -> Option<Filter> {
    let term = search?.trim();
    if term.is_empty() {
        return None;
    }
    let pattern = Pattern::literal(term);
    Some(Filter::or(
        SEARCH_FIELDS
            .iter()
            .map(|field| Filter::regex(*field, pattern.clone()))
            .collect(),
    ))
}

/// Location constraint, in order of precedence.
#[derive(Debug, Clone, PartialEq)]
enum LocationConstraint {
    /// `remote=true`: location contains "remote". Wins over `location`.
    Remote,
    /// Separator-tolerant whole-value match on `location`.
    Named(Pattern),
}

impl LocationConstraint {
    fn resolve(request: &JobFilterRequest) -> Option<Self> {
        if request.remote {
            return Some(Self::Remote);
        }
        request
            .location
            .as_deref()
            .and_then(Pattern::separator_tolerant)
            .map(Self::Named)
    }

    fn into_filter(self) -> Filter {
        match self {
            Self::Remote => Filter::regex(fields::LOCATION, Pattern::contains(REMOTE_MARKER)),
            Self::Named(pattern) => Filter::regex(fields::LOCATION, pattern),
        }
    }
}

fn location_clause(request: &JobFilterRequest) -> Option<Filter> {
    LocationConstraint::resolve(request).map(LocationConstraint::into_filter)
}

/// Salary clause. Missing stored bounds count as unbounded.
///
/// With both bounds this is interval overlap. With a single bound the match
/// is a looser union that also accepts a job whose opposite bound satisfies
/// the request.
fn salary_clause(min: Option<f64>, max: Option<f64>) -> Option<Filter> {
    match (min, max) {
        (Some(min), Some(max)) => Some(Filter::and(vec![
            Filter::or(vec![
                Filter::lte(fields::SALARY_MIN, max),
                Filter::exists(fields::SALARY_MIN, false),
            ]),
            Filter::or(vec![
                Filter::gte(fields::SALARY_MAX, min),
                Filter::exists(fields::SALARY_MAX, false),
            ]),
        ])),
        (Some(min), None) => Some(Filter::or(vec![
            Filter::gte(fields::SALARY_MAX, min),
            Filter::gte(fields::SALARY_MIN, min),
            Filter::exists(fields::SALARY_MAX, false),
        ])),
        (None, Some(max)) => Some(Filter::or(vec![
            Filter::lte(fields::SALARY_MIN, max),
            Filter::lte(fields::SALARY_MAX, max),
            Filter::exists(fields::SALARY_MIN, false),
        ])),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use jobboard_models::{Job, JobId, JobType, SalaryRange};
    use serde_json::Value;

    fn job(title: &str, location: &str, job_type: JobType, min: Option<f64>, max: Option<f64>) -> Value {
        let job = Job {
            id: JobId::new(),
            title: title.to_string(),
            company_name: "Acme".to_string(),
            location: location.to_string(),
            locations: vec![location.to_string()],
            job_type,
            salary_range: SalaryRange {
                min,
                max,
                ..Default::default()
            },
            description: "Ship reliable services".to_string(),
            requirements: vec![],
            responsibilities: vec![],
            application_deadline: None,
            is_published: true,
            created_by: None,
            slug: None,
            views: 0,
            applicants_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        serde_json::to_value(job).unwrap()
    }

    fn titled(title: &str) -> Value {
        job(title, "Pune", JobType::FullTime, None, None)
    }

    fn typed(job_type: JobType) -> Value {
        job("Engineer", "Pune", job_type, None, None)
    }

    fn located(location: &str) -> Value {
        job("Engineer", location, JobType::FullTime, None, None)
    }

    fn paid(min: Option<f64>, max: Option<f64>) -> Value {
        job("Engineer", "Pune", JobType::FullTime, min, max)
    }

    fn matches(request: &JobFilterRequest, doc: &Value) -> bool {
        build_job_filter(request).matcher().unwrap().matches(doc)
    }

    fn search(term: &str) -> JobFilterRequest {
        JobFilterRequest {
            search: Some(term.to_string()),
            ..Default::default()
        }
    }

    fn salary(min: Option<f64>, max: Option<f64>) -> JobFilterRequest {
        JobFilterRequest {
            min_salary: min,
            max_salary: max,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_request_only_requires_published() {
        let filter = build_job_filter(&JobFilterRequest::default());
        assert_eq!(filter, Filter::and(vec![Filter::eq(fields::IS_PUBLISHED, true)]));

        let mut unpublished = titled("Hidden");
        unpublished["isPublished"] = Value::Bool(false);
        let matcher = filter.matcher().unwrap();
        assert!(matcher.matches(&titled("Visible")));
        assert!(!matcher.matches(&unpublished));
    }

    #[test]
    fn test_search_is_literal() {
        assert!(matches(&search("C++"), &titled("C++ Developer")));
        assert!(!matches(&search("a.b"), &titled("axb")));
        assert!(matches(&search("a.b"), &titled("a.b runtime")));
        assert!(matches(&search("(senior)"), &titled("Engineer (Senior)")));
    }

    #[test]
    fn test_search_covers_listed_fields() {
        assert!(matches(&search("acme"), &titled("Engineer")));
        assert!(matches(&search("reliable"), &titled("Engineer")));
        assert!(matches(&search("pune"), &titled("Engineer")));
        assert!(matches(&search("full-time"), &titled("Engineer")));
        assert!(!matches(&search("haskell"), &titled("Engineer")));
    }

    #[test]
    fn test_blank_search_adds_no_clause() {
        let without = build_job_filter(&JobFilterRequest::default());
        assert_eq!(build_job_filter(&search("")), without);
        assert_eq!(build_job_filter(&search("   ")), without);
    }

    #[test]
    fn test_job_type_is_separator_tolerant() {
        let request = |t: &str| JobFilterRequest {
            job_type: Some(t.to_string()),
            ..Default::default()
        };
        assert!(matches(&request("full time"), &typed(JobType::FullTime)));
        assert!(matches(&request("Full-Time"), &typed(JobType::FullTime)));
        assert!(matches(&request("parttime"), &typed(JobType::PartTime)));
        assert!(!matches(&request("full time"), &typed(JobType::PartTime)));
        assert!(!matches(&request("time"), &typed(JobType::FullTime)));
    }

    #[test]
    fn test_separator_only_job_type_adds_no_clause() {
        let request = JobFilterRequest {
            job_type: Some(" - ".to_string()),
            ..Default::default()
        };
        assert_eq!(build_job_filter(&request), build_job_filter(&JobFilterRequest::default()));
    }

    #[test]
    fn test_location_is_anchored_and_tolerant() {
        let request = JobFilterRequest {
            location: Some("new delhi".to_string()),
            ..Default::default()
        };
        assert!(matches(&request, &located("New-Delhi")));
        assert!(matches(&request, &located("NEW DELHI")));
        assert!(!matches(&request, &located("New Delhi, India")));
    }

    #[test]
    fn test_remote_overrides_location() {
        let request = JobFilterRequest {
            location: Some("Delhi".to_string()),
            remote: true,
            ..Default::default()
        };
        assert!(matches(&request, &located("Remote - India")));
        assert!(!matches(&request, &located("Delhi")));

        let filter = build_job_filter(&request);
        let rendered = filter.to_document().to_string();
        assert!(!rendered.contains("D[-_"));
    }

    #[test]
    fn test_location_applies_when_remote_is_off() {
        let request = JobFilterRequest {
            location: Some("Delhi".to_string()),
            remote: false,
            ..Default::default()
        };
        assert!(matches(&request, &located("Delhi")));
        assert!(!matches(&request, &located("Remote - India")));
        assert_eq!(
            LocationConstraint::resolve(&request),
            Pattern::separator_tolerant("Delhi").map(LocationConstraint::Named)
        );

        let remote_only = JobFilterRequest {
            remote: true,
            ..Default::default()
        };
        assert!(matches(&remote_only, &located("Remote - India")));
        assert!(!matches(&remote_only, &located("Delhi")));
    }

    #[test]
    fn test_salary_both_bounds_overlap() {
        let job = paid(Some(50.0), Some(70.0));
        assert!(matches(&salary(Some(60.0), Some(80.0)), &job));
        assert!(!matches(&salary(Some(80.0), Some(100.0)), &job));
        assert!(!matches(&salary(Some(10.0), Some(40.0)), &job));
        assert!(matches(&salary(Some(70.0), Some(90.0)), &job));
    }

    #[test]
    fn test_salary_both_bounds_treat_missing_as_unbounded() {
        assert!(matches(&salary(Some(80.0), Some(100.0)), &paid(Some(50.0), None)));
        assert!(matches(&salary(Some(10.0), Some(40.0)), &paid(None, Some(70.0))));
        assert!(matches(&salary(Some(10.0), Some(40.0)), &paid(None, None)));
        assert!(!matches(&salary(Some(10.0), Some(40.0)), &paid(Some(50.0), None)));
    }

    #[test]
    fn test_salary_min_only_is_lenient_union() {
        let request = salary(Some(60.0), None);
        assert!(matches(&request, &paid(Some(50.0), Some(70.0))));
        assert!(matches(&request, &paid(Some(65.0), None)));
        assert!(matches(&request, &paid(None, None)));
        assert!(!matches(&request, &paid(Some(30.0), Some(50.0))));
        assert!(!matches(&request, &paid(None, Some(50.0))));
    }

    #[test]
    fn test_salary_max_only_is_lenient_union() {
        let request = salary(None, Some(60.0));
        assert!(matches(&request, &paid(Some(50.0), Some(70.0))));
        assert!(matches(&request, &paid(None, Some(55.0))));
        assert!(matches(&request, &paid(None, Some(90.0))));
        assert!(!matches(&request, &paid(Some(65.0), Some(90.0))));
        assert!(!matches(&request, &paid(Some(65.0), None)));
    }

    #[test]
    fn test_salary_single_bound_accepts_either_branch() {
        // Only the stored max is at or under the requested max.
        let request = salary(None, Some(60.0));
        assert!(matches(&request, &paid(Some(70.0), Some(55.0))));
        assert!(matches(&request, &paid(Some(40.0), Some(50.0))));
        assert!(!matches(&request, &paid(Some(70.0), Some(65.0))));

        // Only the stored min is at or over the requested min.
        let request = salary(Some(60.0), None);
        assert!(matches(&request, &paid(Some(65.0), Some(50.0))));
        assert!(matches(&request, &paid(Some(70.0), Some(90.0))));
        assert!(!matches(&request, &paid(Some(55.0), Some(58.0))));
    }

    #[test]
    fn test_no_salary_bounds_adds_no_clause() {
        assert_eq!(
            build_job_filter(&salary(None, None)),
            build_job_filter(&JobFilterRequest::default())
        );
    }

    #[test]
    fn test_clauses_combine_conjunctively() {
        let request = JobFilterRequest {
            search: Some("rust".to_string()),
            job_type: Some("contract".to_string()),
            min_salary: Some(40.0),
            max_salary: Some(60.0),
            ..Default::default()
        };
        assert!(matches(
            &request,
            &job("Rust Engineer", "Pune", JobType::Contract, Some(45.0), Some(55.0))
        ));
        assert!(!matches(
            &request,
            &job("Rust Engineer", "Pune", JobType::FullTime, Some(45.0), Some(55.0))
        ));
        assert!(!matches(
            &request,
            &job("Go Engineer", "Pune", JobType::Contract, Some(45.0), Some(55.0))
        ));
    }

    #[test]
    fn test_builder_is_idempotent() {
        let request = JobFilterRequest {
            search: Some("C++".to_string()),
            location: Some("Delhi".to_string()),
            max_salary: Some(90.0),
            ..Default::default()
        };
        assert_eq!(build_job_filter(&request), build_job_filter(&request));
        assert_eq!(
            build_job_filter(&request).to_document(),
            build_job_filter(&request).to_document()
        );
    }
}
