use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;

use crate::workflows::supply::http::{error_response, store_error_response};

use super::domain::{EligibilityState, ProfileId, ProfileSubmission, ReviewDecision};
use super::repository::ProfileRepository;
use super::service::{EligibilityService, EligibilityServiceError};

/// Router exposing donor intake and medical review.
pub fn donor_router<R>(service: Arc<EligibilityService<R>>) -> Router
where
    R: ProfileRepository + 'static,
{
    Router::new()
        .route("/api/v1/donors/profiles", post(submit_handler::<R>))
        .route(
            "/api/v1/donors/profiles/:profile_id",
            get(status_handler::<R>),
        )
        .route(
            "/api/v1/donors/profiles/:profile_id/review",
            post(review_handler::<R>),
        )
        .route(
            "/api/v1/donors/profiles/:profile_id/override",
            post(override_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct ReviewRequest {
    decision: ReviewDecision,
}

#[derive(Debug, Deserialize)]
struct OverrideRequest {
    target: EligibilityState,
    note: String,
}

async fn submit_handler<R>(
    State(service): State<Arc<EligibilityService<R>>>,
    Json(submission): Json<ProfileSubmission>,
) -> Response
where
    R: ProfileRepository + 'static,
{
    let today = Local::now().date_naive();
    match service.submit_profile(submission, today) {
        Ok(profile) => (StatusCode::CREATED, Json(profile.status_view())).into_response(),
        Err(err) => service_error_response(err),
    }
}

async fn status_handler<R>(
    State(service): State<Arc<EligibilityService<R>>>,
    Path(profile_id): Path<String>,
) -> Response
where
    R: ProfileRepository + 'static,
{
    match service.get(&ProfileId(profile_id)) {
        Ok(profile) => (StatusCode::OK, Json(profile.status_view())).into_response(),
        Err(err) => service_error_response(err),
    }
}

async fn review_handler<R>(
    State(service): State<Arc<EligibilityService<R>>>,
    Path(profile_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Response
where
    R: ProfileRepository + 'static,
{
    match service.review_profile(&ProfileId(profile_id), request.decision) {
        Ok(profile) => (StatusCode::OK, Json(profile.status_view())).into_response(),
        Err(err) => service_error_response(err),
    }
}

async fn override_handler<R>(
    State(service): State<Arc<EligibilityService<R>>>,
    Path(profile_id): Path<String>,
    Json(request): Json<OverrideRequest>,
) -> Response
where
    R: ProfileRepository + 'static,
{
    let now = Local::now().naive_local();
    match service.override_state(&ProfileId(profile_id), request.target, &request.note, now) {
        Ok(profile) => (StatusCode::OK, Json(profile.status_view())).into_response(),
        Err(err) => service_error_response(err),
    }
}

fn service_error_response(err: EligibilityServiceError) -> Response {
    match err {
        EligibilityServiceError::Intake(inner) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "validation", inner.to_string())
        }
        EligibilityServiceError::OverrideNoteRequired => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation",
            err.to_string(),
        ),
        EligibilityServiceError::Transition(inner) => {
            error_response(StatusCode::CONFLICT, "invalid_transition", inner.to_string())
        }
        EligibilityServiceError::Store(inner) => store_error_response(&inner),
    }
}
