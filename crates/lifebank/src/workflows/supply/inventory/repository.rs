use crate::workflows::supply::domain::{BloodType, ComponentKind};
use crate::workflows::supply::requests::domain::RequestId;
use crate::workflows::supply::store::StoreError;

use super::domain::{BloodUnit, ComponentId, SeparatedComponent, UnitId};

/// Storage seam for collected units. `update` is a compare-and-swap on
/// `version`.
pub trait UnitRepository: Send + Sync {
    fn insert(&self, unit: BloodUnit) -> Result<BloodUnit, StoreError>;
    fn update(&self, unit: BloodUnit) -> Result<BloodUnit, StoreError>;
    fn fetch(&self, id: &UnitId) -> Result<Option<BloodUnit>, StoreError>;
    fn list(&self) -> Result<Vec<BloodUnit>, StoreError>;
}

/// Storage seam for separated components.
///
/// `insert_all` is all-or-nothing: either every component of a separation is
/// persisted or none are. `reserve` is the inventory's single serialized
/// critical section — every named component must be available, and all flip
/// to reserved under one lock, so two competing requests resolve to exactly
/// one winner.
pub trait ComponentRepository: Send + Sync {
    fn insert_all(&self, components: Vec<SeparatedComponent>) -> Result<(), StoreError>;
    fn fetch(&self, id: &ComponentId) -> Result<Option<SeparatedComponent>, StoreError>;
    fn fetch_many(&self, ids: &[ComponentId]) -> Result<Vec<SeparatedComponent>, StoreError>;
    fn list_by_unit(&self, unit_id: &UnitId) -> Result<Vec<SeparatedComponent>, StoreError>;
    fn list(&self) -> Result<Vec<SeparatedComponent>, StoreError>;
    fn reserve(
        &self,
        ids: &[ComponentId],
        request: &RequestId,
    ) -> Result<Vec<SeparatedComponent>, StoreError>;
    fn release(&self, request: &RequestId) -> Result<Vec<SeparatedComponent>, StoreError>;
    fn available_volume(
        &self,
        blood_type: BloodType,
        kind: ComponentKind,
    ) -> Result<u32, StoreError>;
}
