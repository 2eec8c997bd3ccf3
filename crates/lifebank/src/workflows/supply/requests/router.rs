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

use crate::workflows::supply::events::EventPublisher;
use crate::workflows::supply::http::{error_response, store_error_response};
use crate::workflows::supply::inventory::domain::ComponentId;
use crate::workflows::supply::inventory::repository::ComponentRepository;

use super::domain::{Decision, RequestDraft, RequestId};
use super::repository::RequestRepository;
use super::service::{FulfillmentError, FulfillmentService};

/// Router exposing request intake, adjudication, and allocation.
pub fn request_router<R, C, N>(service: Arc<FulfillmentService<R, C, N>>) -> Router
where
    R: RequestRepository + 'static,
    C: ComponentRepository + 'static,
    N: EventPublisher + 'static,
{
    Router::new()
        .route("/api/v1/requests", post(create_handler::<R, C, N>))
        .route("/api/v1/requests/:request_id", get(status_handler::<R, C, N>))
        .route(
            "/api/v1/requests/:request_id/decision",
            post(decide_handler::<R, C, N>),
        )
        .route(
            "/api/v1/requests/:request_id/allocate",
            post(allocate_handler::<R, C, N>),
        )
        .route(
            "/api/v1/requests/:request_id/payment",
            post(confirm_payment_handler::<R, C, N>),
        )
        .route(
            "/api/v1/requests/:request_id/cancel-hold",
            post(cancel_hold_handler::<R, C, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct DecideRequest {
    decision: Decision,
}

#[derive(Debug, Deserialize)]
struct AllocateRequest {
    component_ids: Vec<ComponentId>,
}

async fn create_handler<R, C, N>(
    State(service): State<Arc<FulfillmentService<R, C, N>>>,
    Json(draft): Json<RequestDraft>,
) -> Response
where
    R: RequestRepository + 'static,
    C: ComponentRepository + 'static,
    N: EventPublisher + 'static,
{
    let now = Local::now().naive_local();
    match service.create_request(draft, now) {
        Ok(request) => (StatusCode::CREATED, Json(request.status_view())).into_response(),
        Err(err) => fulfillment_error_response(err),
    }
}

async fn status_handler<R, C, N>(
    State(service): State<Arc<FulfillmentService<R, C, N>>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: RequestRepository + 'static,
    C: ComponentRepository + 'static,
    N: EventPublisher + 'static,
{
    match service.get(&RequestId(request_id)) {
        Ok(request) => (StatusCode::OK, Json(request.status_view())).into_response(),
        Err(err) => fulfillment_error_response(err),
    }
}

async fn decide_handler<R, C, N>(
    State(service): State<Arc<FulfillmentService<R, C, N>>>,
    Path(request_id): Path<String>,
    Json(request): Json<DecideRequest>,
) -> Response
where
    R: RequestRepository + 'static,
    C: ComponentRepository + 'static,
    N: EventPublisher + 'static,
{
    match service.decide(&RequestId(request_id), request.decision) {
        Ok(updated) => (StatusCode::OK, Json(updated.status_view())).into_response(),
        Err(err) => fulfillment_error_response(err),
    }
}

async fn allocate_handler<R, C, N>(
    State(service): State<Arc<FulfillmentService<R, C, N>>>,
    Path(request_id): Path<String>,
    Json(request): Json<AllocateRequest>,
) -> Response
where
    R: RequestRepository + 'static,
    C: ComponentRepository + 'static,
    N: EventPublisher + 'static,
{
    match service.allocate(&RequestId(request_id), request.component_ids) {
        Ok(updated) => (StatusCode::OK, Json(updated.status_view())).into_response(),
        Err(err) => fulfillment_error_response(err),
    }
}

async fn confirm_payment_handler<R, C, N>(
    State(service): State<Arc<FulfillmentService<R, C, N>>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: RequestRepository + 'static,
    C: ComponentRepository + 'static,
    N: EventPublisher + 'static,
{
    match service.confirm_payment(&RequestId(request_id)) {
        Ok(updated) => (StatusCode::OK, Json(updated.status_view())).into_response(),
        Err(err) => fulfillment_error_response(err),
    }
}

async fn cancel_hold_handler<R, C, N>(
    State(service): State<Arc<FulfillmentService<R, C, N>>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: RequestRepository + 'static,
    C: ComponentRepository + 'static,
    N: EventPublisher + 'static,
{
    match service.cancel_hold(&RequestId(request_id)) {
        Ok(updated) => (StatusCode::OK, Json(updated.status_view())).into_response(),
        Err(err) => fulfillment_error_response(err),
    }
}

fn fulfillment_error_response(err: FulfillmentError) -> Response {
    match err {
        FulfillmentError::Validation(inner) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation",
            inner.to_string(),
        ),
        FulfillmentError::Allocation(inner) => error_response(
            StatusCode::CONFLICT,
            "insufficient_inventory",
            inner.to_string(),
        ),
        FulfillmentError::Transition(inner) => {
            error_response(StatusCode::CONFLICT, "invalid_transition", inner.to_string())
        }
        FulfillmentError::Store(inner) => store_error_response(&inner),
    }
}
