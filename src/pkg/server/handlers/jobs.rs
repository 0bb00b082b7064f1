use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            adaptors::jobs::spec::{JobEntry, JobPatch, NewJob, Status},
            gateway::parse_id,
        },
        server::state::AppState,
    },
    prelude::{Error, Result},
};

const MISSING_FIELDS: &str = "Missing required fields";

#[derive(Deserialize, Validate)]
pub struct CreateJobInput {
    #[validate(required, length(min = 1))]
    pub title: Option<String>,
    #[validate(required, length(min = 1))]
    pub company: Option<String>,
    #[validate(required, length(min = 1))]
    pub location: Option<String>,
    #[validate(required, length(min = 1))]
    pub status: Option<String>,
}

impl TryFrom<CreateJobInput> for NewJob {
    type Error = Error;

    fn try_from(input: CreateJobInput) -> Result<Self> {
        input.validate().map_err(|_| Error::invalid(MISSING_FIELDS))?;
        match (input.title, input.company, input.location, input.status) {
            (Some(title), Some(company), Some(location), Some(status)) => Ok(NewJob {
                title,
                company,
                location,
                status: status.parse().map_err(Error::invalid)?,
            }),
            _ => Err(Error::invalid(MISSING_FIELDS)),
        }
    }
}

/// Any subset of the editable fields. Unknown keys such as `id` or
/// `createdAt` are ignored so a client can send back a whole record.
#[derive(Deserialize, Default)]
pub struct PatchJobInput {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
}

impl TryFrom<PatchJobInput> for JobPatch {
    type Error = Error;

    fn try_from(input: PatchJobInput) -> Result<Self> {
        let status = input
            .status
            .map(|s| s.parse::<Status>())
            .transpose()
            .map_err(Error::invalid)?;
        Ok(JobPatch {
            title: input.title,
            company: input.company,
            location: input.location,
            status,
        })
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<JobEntry>>> {
    let jobs = async { state.gateway.connect().await?.list_all().await }
        .await
        .map_err(|e| e.during("Failed to load jobs"))?;
    tracing::debug!("listing {} jobs", jobs.len());
    Ok(Json(jobs))
}

pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateJobInput>, JsonRejection>,
) -> Result<Json<JobEntry>> {
    let Json(input) = body?;
    let job = NewJob::try_from(input)?;
    let job = async { state.gateway.connect().await?.create(job).await }
        .await
        .map_err(|e| e.during("Failed to create job"))?;
    tracing::info!("created job {} ({} at {})", job.id, job.title, job.company);
    Ok(Json(job))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<PatchJobInput>, JsonRejection>,
) -> Result<Json<Option<JobEntry>>> {
    let Json(input) = body?;
    let patch = JobPatch::try_from(input)?;
    let job = async {
        let id = parse_id(&id)?;
        state.gateway.connect().await?.update_by_id(id, patch).await
    }
    .await
    .map_err(|e| e.during("Failed to update job"))?;
    if job.is_none() {
        tracing::warn!("update for unknown job {}", id);
    }
    Ok(Json(job))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let removed = async {
        let id = parse_id(&id)?;
        state.gateway.connect().await?.delete_by_id(id).await
    }
    .await
    .map_err(|e| e.during("Failed to delete job"))?;
    tracing::info!("deleted job {} (existed: {})", id, removed);
    Ok(Json(json!({ "message": "Deleted" })))
}
