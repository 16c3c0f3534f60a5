use axum::{
    Form, Json,
    body::Body,
    extract::{Path, State, rejection::FormRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tokio_util::io::ReaderStream;
use tracing::info;

use super::{
    models::{AddLinkForm, LinkAddedResponse, TaskCreatedResponse, TaskStatusResponse},
    state::AppState,
    utils::{archive_download_link, parse_task_id, zip_mime},
};
use crate::api::error::ApiError;

/// Task creation endpoint (POST /api/tasks/create)
///
/// Returns 201 with the new task id, or 503 when the open-task cap is reached.
pub async fn create_task(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = state.tasks.create_task().await?;

    Ok((StatusCode::CREATED, Json(TaskCreatedResponse { task_id })))
}

/// Link submission endpoint (POST /api/tasks/{id}/add-link)
///
/// Expects a form body with a `link` field. The download runs in the
/// background; its outcome shows up on the status endpoint.
pub async fn add_link(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    form: Result<Form<AddLinkForm>, FormRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = parse_task_id(&raw_id)?;
    let Form(form) = form?;

    // Download runs detached; the handle is dropped unawaited
    let _download = state.tasks.append_link(task_id, form.link).await?;

    Ok((
        StatusCode::OK,
        Json(LinkAddedResponse {
            task_id,
            message: "link added to task".to_string(),
        }),
    ))
}

/// Task status endpoint (GET /api/tasks/{id}/status)
///
/// Reading the status settles it: enough outcomes with at least one success
/// marks the task completed. When the task qualifies for archiving, the
/// archive is (re)built and its download link is included.
pub async fn get_status(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = parse_task_id(&raw_id)?;

    let task = state.tasks.get_task(task_id).await?;

    let download_link = state
        .tasks
        .archive_if_ready(&task)
        .await?
        .map(|_| archive_download_link(state.config.server.public_url.as_deref(), task_id));

    info!(task_id, status = %task.status, archived = download_link.is_some(), "Task status read");

    Ok((
        StatusCode::OK,
        Json(TaskStatusResponse {
            task: task.view(),
            download_link,
        }),
    ))
}

/// Archive download endpoint (GET /api/archives/{id}/download)
///
/// 404 until a status read has built the archive.
pub async fn download_archive(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = parse_task_id(&raw_id)?;

    let path = state.tasks.archive_path_for(task_id).await?;

    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        ApiError::Internal(format!("failed to open archive {}: {}", path.display(), e))
    })?;
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, zip_mime().to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"archive.zip\"".to_string(),
            ),
        ],
        body,
    ))
}

/// Health check endpoint (GET /health)
///
/// Reports component status, the number of downloads currently running and
/// the in-process counters.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    use std::collections::HashMap;

    let mut components = HashMap::new();
    components.insert("api".to_string(), "healthy".to_string());
    components.insert("task_store".to_string(), "healthy".to_string());
    components.insert("scheduler".to_string(), "healthy".to_string());

    let response = super::models::HealthResponse {
        status: "healthy".to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
        downloads_in_flight: state.tasks.scheduler().in_flight(),
        metrics: state.metrics.snapshot(),
    };

    (StatusCode::OK, Json(response))
}
