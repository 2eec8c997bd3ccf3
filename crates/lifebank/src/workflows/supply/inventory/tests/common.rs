use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::workflows::supply::domain::{BloodType, ComponentKind};
use crate::workflows::supply::inventory::domain::{ComponentSpec, SeparatedComponent, UnitDraft};
use crate::workflows::supply::inventory::repository::ComponentRepository;
use crate::workflows::supply::inventory::separation::SeparationEngine;
use crate::workflows::supply::inventory::service::{InventoryPolicy, UnitInventory};
use crate::workflows::supply::memory::{MemoryComponents, MemoryUnits};
use crate::workflows::supply::requests::domain::RequestId;
use crate::workflows::supply::store::StoreError;

pub(super) fn inventory() -> Arc<UnitInventory<MemoryUnits>> {
    Arc::new(UnitInventory::new(
        Arc::new(MemoryUnits::default()),
        InventoryPolicy::default(),
    ))
}

pub(super) fn engine(
    inventory: Arc<UnitInventory<MemoryUnits>>,
) -> (
    SeparationEngine<MemoryUnits, MemoryComponents>,
    Arc<MemoryComponents>,
) {
    let components = Arc::new(MemoryComponents::default());
    (
        SeparationEngine::new(inventory, components.clone()),
        components,
    )
}

pub(super) fn draft() -> UnitDraft {
    UnitDraft {
        donor_id: None,
        registration_id: None,
        blood_type: BloodType::ONegative,
        volume_ml: 450,
        collected_on: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
        expires_on: NaiveDate::from_ymd_opt(2025, 2, 12).expect("valid date"),
    }
}

pub(super) fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 2)
        .expect("valid date")
        .and_hms_opt(9, 0, 0)
        .expect("valid time")
}

pub(super) fn standard_plan() -> Vec<ComponentSpec> {
    vec![
        ComponentSpec {
            kind: ComponentKind::RedCell,
            volume_ml: 200,
            expires_on: None,
        },
        ComponentSpec {
            kind: ComponentKind::Plasma,
            volume_ml: 150,
            expires_on: None,
        },
        ComponentSpec {
            kind: ComponentKind::Platelet,
            volume_ml: 80,
            expires_on: None,
        },
    ]
}

/// Component store whose batch write always fails, for rollback tests.
pub(super) struct FailingComponents;

impl ComponentRepository for FailingComponents {
    fn insert_all(&self, _components: Vec<SeparatedComponent>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("component store offline".to_string()))
    }

    fn fetch(
        &self,
        _id: &crate::workflows::supply::inventory::domain::ComponentId,
    ) -> Result<Option<SeparatedComponent>, StoreError> {
        Ok(None)
    }

    fn fetch_many(
        &self,
        _ids: &[crate::workflows::supply::inventory::domain::ComponentId],
    ) -> Result<Vec<SeparatedComponent>, StoreError> {
        Ok(Vec::new())
    }

    fn list_by_unit(
        &self,
        _unit_id: &crate::workflows::supply::inventory::domain::UnitId,
    ) -> Result<Vec<SeparatedComponent>, StoreError> {
        Ok(Vec::new())
    }

    fn list(&self) -> Result<Vec<SeparatedComponent>, StoreError> {
        Ok(Vec::new())
    }

    fn reserve(
        &self,
        _ids: &[crate::workflows::supply::inventory::domain::ComponentId],
        _request: &RequestId,
    ) -> Result<Vec<SeparatedComponent>, StoreError> {
        Err(StoreError::Unavailable("component store offline".to_string()))
    }

    fn release(&self, _request: &RequestId) -> Result<Vec<SeparatedComponent>, StoreError> {
        Ok(Vec::new())
    }

    fn available_volume(
        &self,
        _blood_type: BloodType,
        _kind: ComponentKind,
    ) -> Result<u32, StoreError> {
        Ok(0)
    }
}
