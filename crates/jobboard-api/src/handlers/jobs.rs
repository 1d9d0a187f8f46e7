//! Job posting handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use jobboard_models::{Job, JobListQuery, JobUpdate, NewJob};
use serde::Serialize;

use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Serialize)]
pub struct JobCreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub job: Job,
}

#[derive(Serialize)]
pub struct JobListResponse {
    pub success: bool,
    pub count: usize,
    pub jobs: Vec<Job>,
}

#[derive(Serialize)]
pub struct JobResponse {
    pub success: bool,
    pub job: Job,
}

#[derive(Serialize)]
pub struct JobDeletedResponse {
    pub success: bool,
    pub message: &'static str,
}

/// POST /api/v1/createJob
pub async fn create_job(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<NewJob>,
) -> ApiResult<(StatusCode, Json<JobCreatedResponse>)> {
    let job = state.job_service.create(payload, admin.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(JobCreatedResponse {
            success: true,
            message: "Job created successfully",
            job,
        }),
    ))
}

/// GET /api/v1/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> ApiResult<Json<JobListResponse>> {
    let jobs = state.job_service.list(query).await?;
    Ok(Json(JobListResponse {
        success: true,
        count: jobs.len(),
        jobs,
    }))
}

/// GET /api/v1/jobs/:id
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let job = state.job_service.get(&id).await?;
    Ok(Json(JobResponse { success: true, job }))
}

/// PUT /api/v1/jobs/:id
pub async fn update_job(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<JobUpdate>,
) -> ApiResult<Json<JobResponse>> {
    let job = state.job_service.update(&id, update).await?;
    Ok(Json(JobResponse { success: true, job }))
}

/// DELETE /api/v1/jobs/:id
pub async fn delete_job(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<JobDeletedResponse>> {
    state.job_service.delete(&id).await?;
    Ok(Json(JobDeletedResponse {
        success: true,
        message: "Job deleted",
    }))
}
