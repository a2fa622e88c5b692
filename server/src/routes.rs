use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

mod health;
mod jobs;

/// Job routes are served with and without the trailing slash.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/jobs/", post(jobs::create_job))
        .route("/api/jobs", post(jobs::create_job))
        .route("/api/jobs/{id}/", get(jobs::get_job_status))
        .route("/api/jobs/{id}", get(jobs::get_job_status))
        .route("/health", get(health::health))
}
