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

use super::domain::{ComponentSpec, UnitDraft, UnitId};
use super::repository::{ComponentRepository, UnitRepository};
use super::separation::{SeparationEngine, SeparationError};
use super::service::{InventoryError, UnitInventory};

struct InventoryState<U, C> {
    inventory: Arc<UnitInventory<U>>,
    engine: Arc<SeparationEngine<U, C>>,
}

impl<U, C> Clone for InventoryState<U, C> {
    fn clone(&self) -> Self {
        Self {
            inventory: self.inventory.clone(),
            engine: self.engine.clone(),
        }
    }
}

/// Router exposing unit intake, the separation transitions, and separation
/// itself.
pub fn inventory_router<U, C>(
    inventory: Arc<UnitInventory<U>>,
    engine: Arc<SeparationEngine<U, C>>,
) -> Router
where
    U: UnitRepository + 'static,
    C: ComponentRepository + 'static,
{
    let state = InventoryState { inventory, engine };
    Router::new()
        .route(
            "/api/v1/inventory/units",
            get(list_units_handler::<U, C>).post(intake_handler::<U, C>),
        )
        .route(
            "/api/v1/inventory/units/:unit_id",
            get(unit_handler::<U, C>),
        )
        .route(
            "/api/v1/inventory/units/:unit_id/separate",
            post(separate_handler::<U, C>),
        )
        .route(
            "/api/v1/inventory/units/:unit_id/retry",
            post(retry_handler::<U, C>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SeparateRequest {
    components: Vec<ComponentSpec>,
}

#[derive(Debug, Deserialize)]
struct RetryRequest {
    note: String,
}

async fn intake_handler<U, C>(
    State(state): State<InventoryState<U, C>>,
    Json(draft): Json<UnitDraft>,
) -> Response
where
    U: UnitRepository + 'static,
    C: ComponentRepository + 'static,
{
    match state.inventory.intake_unit(draft) {
        Ok(unit) => (StatusCode::CREATED, Json(unit)).into_response(),
        Err(err) => inventory_error_response(err),
    }
}

async fn list_units_handler<U, C>(State(state): State<InventoryState<U, C>>) -> Response
where
    U: UnitRepository + 'static,
    C: ComponentRepository + 'static,
{
    match state.inventory.list_units() {
        Ok(units) => (StatusCode::OK, Json(units)).into_response(),
        Err(err) => inventory_error_response(err),
    }
}

async fn unit_handler<U, C>(
    State(state): State<InventoryState<U, C>>,
    Path(unit_id): Path<String>,
) -> Response
where
    U: UnitRepository + 'static,
    C: ComponentRepository + 'static,
{
    match state.inventory.fetch_unit(&UnitId(unit_id)) {
        Ok(unit) => (StatusCode::OK, Json(unit)).into_response(),
        Err(err) => inventory_error_response(err),
    }
}

/// Claims the unit (`unprocessed -> processing`) and runs the separation in
/// one staff action.
async fn separate_handler<U, C>(
    State(state): State<InventoryState<U, C>>,
    Path(unit_id): Path<String>,
    Json(request): Json<SeparateRequest>,
) -> Response
where
    U: UnitRepository + 'static,
    C: ComponentRepository + 'static,
{
    let unit_id = UnitId(unit_id);
    if let Err(err) = state.inventory.mark_separating(&unit_id) {
        return inventory_error_response(err);
    }
    let now = Local::now().naive_local();
    match state.engine.separate(&unit_id, request.components, now) {
        Ok(components) => (StatusCode::OK, Json(components)).into_response(),
        Err(err) => separation_error_response(err),
    }
}

async fn retry_handler<U, C>(
    State(state): State<InventoryState<U, C>>,
    Path(unit_id): Path<String>,
    Json(request): Json<RetryRequest>,
) -> Response
where
    U: UnitRepository + 'static,
    C: ComponentRepository + 'static,
{
    let now = Local::now().naive_local();
    match state
        .inventory
        .retry_error(&UnitId(unit_id), &request.note, now)
    {
        Ok(unit) => (StatusCode::OK, Json(unit)).into_response(),
        Err(err) => inventory_error_response(err),
    }
}

fn inventory_error_response(err: InventoryError) -> Response {
    match err {
        InventoryError::Intake(inner) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation",
            inner.to_string(),
        ),
        InventoryError::AuditNoteRequired => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation",
            err.to_string(),
        ),
        InventoryError::Transition(inner) => {
            error_response(StatusCode::CONFLICT, "invalid_transition", inner.to_string())
        }
        InventoryError::Store(inner) => store_error_response(&inner),
    }
}

fn separation_error_response(err: SeparationError) -> Response {
    match err {
        SeparationError::EmptyPlan
        | SeparationError::ZeroVolume { .. }
        | SeparationError::OverVolume { .. } => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation",
            err.to_string(),
        ),
        SeparationError::Transition(inner) => {
            error_response(StatusCode::CONFLICT, "invalid_transition", inner.to_string())
        }
        SeparationError::Inventory(inner) => inventory_error_response(inner),
        SeparationError::Store(inner) => store_error_response(&inner),
    }
}
