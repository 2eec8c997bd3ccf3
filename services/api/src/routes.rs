use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Local;
use serde_json::json;
use std::sync::Arc;

use lifebank::workflows::supply::domain::StockThresholds;
use lifebank::workflows::supply::donors::donor_router;
use lifebank::workflows::supply::drives::drive_router;
use lifebank::workflows::supply::inventory::inventory_router;
use lifebank::workflows::supply::memory::{MemoryComponents, MemoryUnits};
use lifebank::workflows::supply::report::stock_report;
use lifebank::workflows::supply::requests::request_router;

use crate::infra::{AppState, Services};

#[derive(Clone)]
struct StockState {
    units: Arc<MemoryUnits>,
    components: Arc<MemoryComponents>,
    thresholds: StockThresholds,
    horizon_days: i64,
}

pub(crate) fn router(services: &Services) -> Router {
    let stock_state = StockState {
        units: services.units.clone(),
        components: services.components.clone(),
        thresholds: services.stock_thresholds,
        horizon_days: services.expiry_horizon_days,
    };

    donor_router(services.eligibility.clone())
        .merge(drive_router(
            services.registry.clone(),
            services.ledger.clone(),
        ))
        .merge(inventory_router(
            services.inventory.clone(),
            services.engine.clone(),
        ))
        .merge(request_router(services.fulfillment.clone()))
        .merge(
            Router::new()
                .route("/api/v1/reports/stock", get(stock_report_endpoint))
                .with_state(stock_state),
        )
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn stock_report_endpoint(
    axum::extract::State(state): axum::extract::State<StockState>,
) -> axum::response::Response {
    let today = Local::now().date_naive();
    match stock_report(
        &*state.components,
        &*state.units,
        &state.thresholds,
        today,
        state.horizon_days,
    ) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::build_services;
    use lifebank::config::PolicyConfig;

    fn policies() -> PolicyConfig {
        PolicyConfig {
            minimum_donor_age: 17,
            donations_to_complete: 50,
            unit_volume_min_ml: 50,
            unit_volume_max_ml: 1_000,
            expiry_horizon_days: 7,
            low_stock_ml: 2_000,
            critical_stock_ml: 800,
            allow_payment_hold: true,
        }
    }

    #[tokio::test]
    async fn stock_report_endpoint_returns_a_snapshot() {
        let services = build_services(&policies());
        let state = StockState {
            units: services.units.clone(),
            components: services.components.clone(),
            thresholds: services.stock_thresholds,
            horizon_days: services.expiry_horizon_days,
        };

        let response = stock_report_endpoint(axum::extract::State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
