use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;

use crate::workflows::supply::domain::DonorId;
use crate::workflows::supply::donors::ProfileRepository;
use crate::workflows::supply::events::EventPublisher;
use crate::workflows::supply::http::{error_response, store_error_response};

use super::domain::{EventDraft, EventId, RegistrationId, RegistrationStatus};
use super::repository::{EventRepository, RegistrationRepository};
use super::service::{
    EventRegistry, EventRegistryError, RegistrationError, RegistrationLedger,
};

type LedgerState<R, E, P, N> = Arc<RegistrationLedger<R, E, P, N>>;

/// Router exposing event management and the registration ledger.
pub fn drive_router<R, E, P, N>(
    registry: Arc<EventRegistry<E, R>>,
    ledger: LedgerState<R, E, P, N>,
) -> Router
where
    R: RegistrationRepository + 'static,
    E: EventRepository + 'static,
    P: ProfileRepository + 'static,
    N: EventPublisher + 'static,
{
    let events = Router::new()
        .route(
            "/api/v1/drives/events",
            get(list_events_handler::<E, R>).post(create_event_handler::<E, R>),
        )
        .route(
            "/api/v1/drives/events/:event_id",
            delete(delete_event_handler::<E, R>),
        )
        .with_state(registry);

    let registrations = Router::new()
        .route(
            "/api/v1/drives/registrations",
            post(register_handler::<R, E, P, N>),
        )
        .route(
            "/api/v1/drives/registrations/:registration_id/status",
            post(change_status_handler::<R, E, P, N>),
        )
        .with_state(ledger);

    events.merge(registrations)
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    #[serde(default)]
    force: bool,
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    donor_id: DonorId,
    event_id: EventId,
}

#[derive(Debug, Deserialize)]
struct ChangeStatusRequest {
    target: RegistrationStatus,
}

async fn create_event_handler<E, R>(
    State(registry): State<Arc<EventRegistry<E, R>>>,
    Json(draft): Json<EventDraft>,
) -> Response
where
    E: EventRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match registry.create_event(draft) {
        Ok(event) => (StatusCode::CREATED, Json(event)).into_response(),
        Err(err) => registry_error_response(err),
    }
}

async fn list_events_handler<E, R>(
    State(registry): State<Arc<EventRegistry<E, R>>>,
) -> Response
where
    E: EventRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match registry.list_events(Local::now().naive_local()) {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(err) => registry_error_response(err),
    }
}

async fn delete_event_handler<E, R>(
    State(registry): State<Arc<EventRegistry<E, R>>>,
    Path(event_id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Response
where
    E: EventRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match registry.delete_event(&EventId(event_id), params.force) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => registry_error_response(err),
    }
}

async fn register_handler<R, E, P, N>(
    State(ledger): State<LedgerState<R, E, P, N>>,
    Json(request): Json<RegisterRequest>,
) -> Response
where
    R: RegistrationRepository + 'static,
    E: EventRepository + 'static,
    P: ProfileRepository + 'static,
    N: EventPublisher + 'static,
{
    let now = Local::now().naive_local();
    match ledger.register(request.donor_id, request.event_id, now) {
        Ok(registration) => (StatusCode::CREATED, Json(registration)).into_response(),
        Err(err) => ledger_error_response(err),
    }
}

async fn change_status_handler<R, E, P, N>(
    State(ledger): State<LedgerState<R, E, P, N>>,
    Path(registration_id): Path<String>,
    Json(request): Json<ChangeStatusRequest>,
) -> Response
where
    R: RegistrationRepository + 'static,
    E: EventRepository + 'static,
    P: ProfileRepository + 'static,
    N: EventPublisher + 'static,
{
    match ledger.change_status(&RegistrationId(registration_id), request.target) {
        Ok(registration) => (StatusCode::OK, Json(registration)).into_response(),
        Err(err) => ledger_error_response(err),
    }
}

fn registry_error_response(err: EventRegistryError) -> Response {
    match err {
        EventRegistryError::Validation(inner) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation",
            inner.to_string(),
        ),
        EventRegistryError::OpenRegistrations { .. }
        | EventRegistryError::CompletedRegistrations { .. } => {
            error_response(StatusCode::CONFLICT, "conflict", err.to_string())
        }
        EventRegistryError::Transition(inner) => {
            error_response(StatusCode::CONFLICT, "invalid_transition", inner.to_string())
        }
        EventRegistryError::Store(inner) => store_error_response(&inner),
    }
}

fn ledger_error_response(err: RegistrationError) -> Response {
    match err {
        RegistrationError::Blocked { .. } => {
            error_response(StatusCode::FORBIDDEN, "eligibility", err.to_string())
        }
        RegistrationError::ProfileMissing { .. } => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "validation", err.to_string())
        }
        RegistrationError::AlreadyRegistered { .. } | RegistrationError::EventEnded { .. } => {
            error_response(StatusCode::CONFLICT, "conflict", err.to_string())
        }
        RegistrationError::Transition(inner) => {
            error_response(StatusCode::CONFLICT, "invalid_transition", inner.to_string())
        }
        RegistrationError::Eligibility(inner) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            inner.to_string(),
        ),
        RegistrationError::Store(inner) => store_error_response(&inner),
    }
}
