use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use guideline::{StoreError, SubmitError};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub input_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub id: Uuid,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Job not found")
}

pub async fn create_job(
    State(state): State<AppState>,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "non_field_errors": [rejection.body_text()] })),
            )
                .into_response()
        }
    };

    let submission = state.submission.clone();
    let result =
        tokio::task::spawn_blocking(move || submission.submit(request.input_text.as_deref()))
            .await;

    match result {
        Ok(Ok(id)) => (StatusCode::CREATED, Json(CreateJobResponse { id })).into_response(),
        Ok(Err(SubmitError::Validation(errors))) => {
            (StatusCode::BAD_REQUEST, Json(errors)).into_response()
        }
        Ok(Err(e)) => {
            error!("Job submission failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
        Err(e) => {
            error!("Submission task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub async fn get_job_status(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    // Malformed ids cannot name a job.
    let id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => return not_found(),
    };

    let status = state.status.clone();
    let result = tokio::task::spawn_blocking(move || status.status(id)).await;

    match result {
        Ok(Ok(view)) => (StatusCode::OK, Json(view)).into_response(),
        Ok(Err(StoreError::NotFound(_))) => not_found(),
        Ok(Err(e)) => {
            error!("Status lookup for job {} failed: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
        Err(e) => {
            error!("Status task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
