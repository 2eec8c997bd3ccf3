use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::workflows::supply::domain::{BloodType, ComponentKind, StockThresholds, Urgency};
use crate::workflows::supply::inventory::domain::{ComponentId, SeparatedComponent, UnitId};
use crate::workflows::supply::inventory::repository::ComponentRepository;
use crate::workflows::supply::memory::{MemoryComponents, MemoryPublisher, MemoryRequests};
use crate::workflows::supply::requests::domain::RequestDraft;
use crate::workflows::supply::requests::service::{FulfillmentPolicy, FulfillmentService};

pub(super) type Service = FulfillmentService<MemoryRequests, MemoryComponents, MemoryPublisher>;

pub(super) fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 10)
        .expect("valid date")
        .and_hms_opt(11, 0, 0)
        .expect("valid time")
}

pub(super) fn draft() -> RequestDraft {
    RequestDraft {
        patient_name: "J. Ansah".to_string(),
        hospital: "Ridge Hospital".to_string(),
        blood_type: BloodType::ONegative,
        component: ComponentKind::RedCell,
        volume_ml: 200,
        urgency: Urgency::Urgent,
        reason: "scheduled surgery".to_string(),
    }
}

pub(super) fn component(
    id: &str,
    blood_type: BloodType,
    kind: ComponentKind,
    volume_ml: u32,
) -> SeparatedComponent {
    SeparatedComponent {
        component_id: ComponentId(id.to_string()),
        unit_id: UnitId("unit-000001".to_string()),
        blood_type,
        kind,
        volume_ml,
        separated_at: now(),
        expires_on: None,
        available: true,
        reserved_for: None,
        version: 1,
    }
}

pub(super) struct Harness {
    pub(super) service: Service,
    pub(super) components: Arc<MemoryComponents>,
    pub(super) publisher: Arc<MemoryPublisher>,
}

pub(super) fn harness_with_policy(policy: FulfillmentPolicy) -> Harness {
    let requests = Arc::new(MemoryRequests::default());
    let components = Arc::new(MemoryComponents::default());
    let publisher = Arc::new(MemoryPublisher::default());
    let service = FulfillmentService::new(
        requests,
        components.clone(),
        publisher.clone(),
        policy,
    );
    Harness {
        service,
        components,
        publisher,
    }
}

pub(super) fn harness() -> Harness {
    harness_with_policy(FulfillmentPolicy {
        allow_payment_hold: true,
        stock: StockThresholds::new(2_000, 800),
    })
}

/// Seed the component store with O- red cells matching the standard draft.
pub(super) fn seed_red_cells(harness: &Harness, volumes: &[(&str, u32)]) {
    let components = volumes
        .iter()
        .map(|(id, volume_ml)| {
            component(id, BloodType::ONegative, ComponentKind::RedCell, *volume_ml)
        })
        .collect();
    harness
        .components
        .insert_all(components)
        .expect("seed components");
}

pub(super) fn component_ids(ids: &[&str]) -> Vec<ComponentId> {
    ids.iter().map(|id| ComponentId(id.to_string())).collect()
}
