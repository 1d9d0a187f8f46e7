//! Job posting operations.

use jobboard_models::{Job, JobFilterRequest, JobId, JobListQuery, JobUpdate, NewJob, UserId};
use jobboard_store::{DocumentStore, JobRepository};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::metrics;

const JOB_NOT_FOUND: &str = "Job not found";

#[derive(Debug, Clone)]
pub struct JobService {
    jobs: JobRepository,
}

impl JobService {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            jobs: JobRepository::new(store),
        }
    }

    pub async fn create(&self, payload: NewJob, created_by: UserId) -> ApiResult<Job> {
        let job = payload.into_job(Some(created_by))?;
        self.jobs.create(&job).await?;
        metrics::record_job_change("create");
        Ok(job)
    }

    /// Published jobs matching the raw listing query, newest first.
    pub async fn list(&self, query: JobListQuery) -> ApiResult<Vec<Job>> {
        let request = JobFilterRequest::from(query);
        let filtered = request != JobFilterRequest::default();
        let jobs = self.jobs.list(&request).await?;

        debug!(count = jobs.len(), filtered, "Job search");
        metrics::record_job_search(jobs.len(), filtered);
        Ok(jobs)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Job> {
        let id = JobId::parse(id)?;
        self.jobs
            .get(&id)
            .await?
            .ok_or_else(|| ApiError::not_found(JOB_NOT_FOUND))
    }

    /// Apply a whitelisted partial update and return the stored result.
    pub async fn update(&self, id: &str, update: JobUpdate) -> ApiResult<Job> {
        let id = JobId::parse(id)?;
        let changes = update.into_changes()?;

        if !self.jobs.update(&id, &changes).await? {
            return Err(ApiError::not_found(JOB_NOT_FOUND));
        }
        // Deleted between write and read.
        let job = self
            .jobs
            .get(&id)
            .await?
            .ok_or_else(|| ApiError::not_found(JOB_NOT_FOUND))?;

        info!(job_id = %job.id, "Updated job");
        metrics::record_job_change("update");
        Ok(job)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let id = JobId::parse(id)?;
        if !self.jobs.delete(&id).await? {
            return Err(ApiError::not_found(JOB_NOT_FOUND));
        }
        metrics::record_job_change("delete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use jobboard_models::SalaryRange;

    fn payload(title: &str, job_type: &str, location: &str) -> NewJob {
        NewJob {
            title: Some(title.into()),
            company_name: Some("Acme".into()),
            location: Some(location.into()),
            job_type: Some(job_type.into()),
            description: Some("Build things".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_get_and_list() {
        let service = JobService::new(DocumentStore::memory());
        let author = UserId::new();
        let job = service
            .create(payload("Rust Engineer", "Full-time", "Pune"), author.clone())
            .await
            .unwrap();
        assert_eq!(job.created_by, Some(author));

        let fetched = service.get(job.id.as_str()).await.unwrap();
        assert_eq!(fetched, job);

        let listed = service
            .list(JobListQuery {
                job_type: Some("full time".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_required_fields() {
        let service = JobService::new(DocumentStore::memory());
        let mut incomplete = payload("Rust Engineer", "Full-time", "Pune");
        incomplete.description = None;
        let err = service.create(incomplete, UserId::new()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Required fields are missing.");
    }

    #[tokio::test]
    async fn test_invalid_and_missing_ids() {
        let service = JobService::new(DocumentStore::memory());
        let err = service.get("not-an-id").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let missing = JobId::new();
        let err = service.get(missing.as_str()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let err = service.delete(missing.as_str()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_then_delete() {
        let service = JobService::new(DocumentStore::memory());
        let job = service
            .create(payload("Rust Engineer", "Full-time", "Pune"), UserId::new())
            .await
            .unwrap();

        let updated = service
            .update(
                job.id.as_str(),
                JobUpdate {
                    title: Some("Staff Rust Engineer".into()),
                    salary_range: Some(SalaryRange {
                        min: Some(50_000.0),
                        max: Some(90_000.0),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Staff Rust Engineer");
        assert_eq!(service.get(job.id.as_str()).await.unwrap(), updated);

        let err = service
            .update(
                job.id.as_str(),
                JobUpdate {
                    job_type: Some("Gig".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        service.delete(job.id.as_str()).await.unwrap();
        assert!(service.get(job.id.as_str()).await.is_err());

        let err = service
            .update(
                job.id.as_str(),
                JobUpdate {
                    title: Some("Gone".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_to_different_fields() {
        let service = JobService::new(DocumentStore::memory());
        let job = service
            .create(payload("Rust", "Full-time", "Pune"), UserId::new())
            .await
            .unwrap();
        let id = job.id.as_str();

        let (a, b) = tokio::join!(
            service.update(
                id,
                JobUpdate {
                    description: Some("A desc".into()),
                    ..Default::default()
                },
            ),
            service.update(
                id,
                JobUpdate {
                    title: Some("B title".into()),
                    ..Default::default()
                },
            ),
        );
        a.unwrap();
        b.unwrap();

        let stored = service.get(id).await.unwrap();
        assert_eq!(stored.title, "B title");
        assert_eq!(stored.description, "A desc");
        assert_eq!(stored.views, 0);
    }
}
