use crate::service::{MetaCrawl, QueryOutcome};
use crate::MetacrawlError;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Shared state handed to every handler
pub type AppState = Arc<MetaCrawl>;

/// Errors returned to gateway clients as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest,
    TaskNotFound,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest => (StatusCode::BAD_REQUEST, "bad request".to_string()),
            Self::TaskNotFound => (StatusCode::NOT_FOUND, "task not found".to_string()),
            Self::Internal(message) => {
                tracing::error!("Request failed: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<MetacrawlError> for ApiError {
    fn from(err: MetacrawlError) -> Self {
        match err {
            MetacrawlError::EmptySubmission => Self::BadRequest,
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Query string of `GET /tasks/{task_id}`
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    delete: Option<String>,
}

impl TaskQuery {
    /// Only `delete=1` removes the task
    fn should_delete(&self) -> bool {
        self.delete.as_deref() == Some("1")
    }
}

/// `POST /tasks/`: starts a task for the newline-separated URLs in the body
pub async fn create_task(
    State(service): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body = String::from_utf8_lossy(&body);
    let task_id = service.submit(&body)?;

    Ok((StatusCode::CREATED, Json(json!({ "taskID": task_id }))))
}

/// `GET /tasks/{task_id}/`: status of a task, or its CSV once completed
pub async fn get_task(
    State(service): State<AppState>,
    Path(task_id): Path<String>,
    Query(query): Query<TaskQuery>,
) -> Result<Response, ApiError> {
    match service.query(&task_id, query.should_delete()) {
        QueryOutcome::NotFound => Err(ApiError::TaskNotFound),
        QueryOutcome::InProgress => Ok(StatusCode::NO_CONTENT.into_response()),
        QueryOutcome::Completed(csv) => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}.csv", task_id),
                ),
            ],
            csv,
        )
            .into_response()),
    }
}
