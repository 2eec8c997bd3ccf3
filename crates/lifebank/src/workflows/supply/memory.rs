//! Default single-process backend.
//!
//! Every repository keeps its records behind one `Mutex<HashMap>`; `update`
//! calls compare-and-swap on the record `version`, and component reservation
//! checks and flips every named component under a single lock, which is the
//! one serialized critical section the inventory needs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::workflows::supply::domain::{BloodType, ComponentKind, DonorId};
use crate::workflows::supply::donors::domain::{MedicalProfile, ProfileId};
use crate::workflows::supply::donors::repository::ProfileRepository;
use crate::workflows::supply::drives::domain::{
    DonationEvent, EventId, Registration, RegistrationId, RegistrationStatus,
};
use crate::workflows::supply::drives::repository::{EventRepository, RegistrationRepository};
use crate::workflows::supply::events::{EventPublisher, PublishError, SupplyEvent};
use crate::workflows::supply::inventory::domain::{
    BloodUnit, ComponentId, SeparatedComponent, UnitId,
};
use crate::workflows::supply::inventory::repository::{ComponentRepository, UnitRepository};
use crate::workflows::supply::requests::domain::{BloodRequest, RequestId};
use crate::workflows::supply::requests::repository::RequestRepository;
use crate::workflows::supply::store::StoreError;

fn cas_insert<K, V>(
    records: &mut HashMap<K, V>,
    key: K,
    id: &str,
    value: V,
) -> Result<V, StoreError>
where
    K: std::hash::Hash + Eq,
    V: Clone,
{
    if records.contains_key(&key) {
        return Err(StoreError::Duplicate(id.to_string()));
    }
    records.insert(key, value.clone());
    Ok(value)
}

fn cas_update<K, V>(
    records: &mut HashMap<K, V>,
    key: K,
    id: &str,
    mut value: V,
    read_version: u64,
    version_of: impl Fn(&V) -> u64,
    bump: impl Fn(&mut V),
) -> Result<V, StoreError>
where
    K: std::hash::Hash + Eq,
    V: Clone,
{
    let stored = records
        .get(&key)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    if version_of(stored) != read_version {
        return Err(StoreError::StaleVersion {
            id: id.to_string(),
            expected: read_version,
        });
    }
    bump(&mut value);
    records.insert(key, value.clone());
    Ok(value)
}

#[derive(Default, Clone)]
pub struct MemoryProfiles {
    records: Arc<Mutex<HashMap<ProfileId, MedicalProfile>>>,
}

impl ProfileRepository for MemoryProfiles {
    fn insert(&self, profile: MedicalProfile) -> Result<MedicalProfile, StoreError> {
        let mut guard = self.records.lock().expect("profile mutex poisoned");
        if guard
            .values()
            .any(|stored| stored.donor_id == profile.donor_id)
        {
            return Err(StoreError::Duplicate(profile.donor_id.0.clone()));
        }
        let id = profile.profile_id.0.clone();
        cas_insert(&mut guard, profile.profile_id.clone(), &id, profile)
    }

    fn update(&self, profile: MedicalProfile) -> Result<MedicalProfile, StoreError> {
        let mut guard = self.records.lock().expect("profile mutex poisoned");
        let id = profile.profile_id.0.clone();
        let read_version = profile.version;
        cas_update(
            &mut guard,
            profile.profile_id.clone(),
            &id,
            profile,
            read_version,
            |stored| stored.version,
            |value| value.version += 1,
        )
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<MedicalProfile>, StoreError> {
        let guard = self.records.lock().expect("profile mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_donor(&self, donor_id: &DonorId) -> Result<Option<MedicalProfile>, StoreError> {
        let guard = self.records.lock().expect("profile mutex poisoned");
        Ok(guard
            .values()
            .find(|profile| &profile.donor_id == donor_id)
            .cloned())
    }
}

#[derive(Default, Clone)]
pub struct MemoryEvents {
    records: Arc<Mutex<HashMap<EventId, DonationEvent>>>,
}

impl EventRepository for MemoryEvents {
    fn insert(&self, event: DonationEvent) -> Result<DonationEvent, StoreError> {
        let mut guard = self.records.lock().expect("event mutex poisoned");
        let id = event.event_id.0.clone();
        cas_insert(&mut guard, event.event_id.clone(), &id, event)
    }

    fn update(&self, event: DonationEvent) -> Result<DonationEvent, StoreError> {
        let mut guard = self.records.lock().expect("event mutex poisoned");
        let id = event.event_id.0.clone();
        let read_version = event.version;
        cas_update(
            &mut guard,
            event.event_id.clone(),
            &id,
            event,
            read_version,
            |stored| stored.version,
            |value| value.version += 1,
        )
    }

    fn fetch(&self, id: &EventId) -> Result<Option<DonationEvent>, StoreError> {
        let guard = self.records.lock().expect("event mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<DonationEvent>, StoreError> {
        let guard = self.records.lock().expect("event mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn delete(&self, id: &EventId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("event mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.0.clone()))
    }
}

#[derive(Default, Clone)]
pub struct MemoryRegistrations {
    records: Arc<Mutex<HashMap<RegistrationId, Registration>>>,
}

impl RegistrationRepository for MemoryRegistrations {
    fn insert(&self, registration: Registration) -> Result<Registration, StoreError> {
        let mut guard = self.records.lock().expect("registration mutex poisoned");
        let duplicate = guard.values().any(|stored| {
            stored.donor_id == registration.donor_id
                && stored.event_id == registration.event_id
                && stored.status != RegistrationStatus::Cancelled
        });
        if duplicate {
            return Err(StoreError::Duplicate(format!(
                "{}:{}",
                registration.donor_id.0, registration.event_id.0
            )));
        }
        let id = registration.registration_id.0.clone();
        cas_insert(
            &mut guard,
            registration.registration_id.clone(),
            &id,
            registration,
        )
    }

    fn update(&self, registration: Registration) -> Result<Registration, StoreError> {
        let mut guard = self.records.lock().expect("registration mutex poisoned");
        let id = registration.registration_id.0.clone();
        let read_version = registration.version;
        cas_update(
            &mut guard,
            registration.registration_id.clone(),
            &id,
            registration,
            read_version,
            |stored| stored.version,
            |value| value.version += 1,
        )
    }

    fn fetch(&self, id: &RegistrationId) -> Result<Option<Registration>, StoreError> {
        let guard = self.records.lock().expect("registration mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_active(
        &self,
        donor_id: &DonorId,
        event_id: &EventId,
    ) -> Result<Option<Registration>, StoreError> {
        let guard = self.records.lock().expect("registration mutex poisoned");
        Ok(guard
            .values()
            .find(|registration| {
                &registration.donor_id == donor_id
                    && &registration.event_id == event_id
                    && registration.status != RegistrationStatus::Cancelled
            })
            .cloned())
    }

    fn list_for_event(&self, event_id: &EventId) -> Result<Vec<Registration>, StoreError> {
        let guard = self.records.lock().expect("registration mutex poisoned");
        Ok(guard
            .values()
            .filter(|registration| &registration.event_id == event_id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct MemoryUnits {
    records: Arc<Mutex<HashMap<UnitId, BloodUnit>>>,
}

impl UnitRepository for MemoryUnits {
    fn insert(&self, unit: BloodUnit) -> Result<BloodUnit, StoreError> {
        let mut guard = self.records.lock().expect("unit mutex poisoned");
        let id = unit.unit_id.0.clone();
        cas_insert(&mut guard, unit.unit_id.clone(), &id, unit)
    }

    fn update(&self, unit: BloodUnit) -> Result<BloodUnit, StoreError> {
        let mut guard = self.records.lock().expect("unit mutex poisoned");
        let id = unit.unit_id.0.clone();
        let read_version = unit.version;
        cas_update(
            &mut guard,
            unit.unit_id.clone(),
            &id,
            unit,
            read_version,
            |stored| stored.version,
            |value| value.version += 1,
        )
    }

    fn fetch(&self, id: &UnitId) -> Result<Option<BloodUnit>, StoreError> {
        let guard = self.records.lock().expect("unit mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<BloodUnit>, StoreError> {
        let guard = self.records.lock().expect("unit mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct MemoryComponents {
    records: Arc<Mutex<HashMap<ComponentId, SeparatedComponent>>>,
}

impl ComponentRepository for MemoryComponents {
    fn insert_all(&self, components: Vec<SeparatedComponent>) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("component mutex poisoned");
        for component in &components {
            if guard.contains_key(&component.component_id) {
                return Err(StoreError::Duplicate(component.component_id.0.clone()));
            }
        }
        for component in components {
            guard.insert(component.component_id.clone(), component);
        }
        Ok(())
    }

    fn fetch(&self, id: &ComponentId) -> Result<Option<SeparatedComponent>, StoreError> {
        let guard = self.records.lock().expect("component mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_many(&self, ids: &[ComponentId]) -> Result<Vec<SeparatedComponent>, StoreError> {
        let guard = self.records.lock().expect("component mutex poisoned");
        ids.iter()
            .map(|id| {
                guard
                    .get(id)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound(id.0.clone()))
            })
            .collect()
    }

    fn list_by_unit(&self, unit_id: &UnitId) -> Result<Vec<SeparatedComponent>, StoreError> {
        let guard = self.records.lock().expect("component mutex poisoned");
        Ok(guard
            .values()
            .filter(|component| &component.unit_id == unit_id)
            .cloned()
            .collect())
    }

    fn list(&self) -> Result<Vec<SeparatedComponent>, StoreError> {
        let guard = self.records.lock().expect("component mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn reserve(
        &self,
        ids: &[ComponentId],
        request: &RequestId,
    ) -> Result<Vec<SeparatedComponent>, StoreError> {
        let mut guard = self.records.lock().expect("component mutex poisoned");
        for id in ids {
            let component = guard
                .get(id)
                .ok_or_else(|| StoreError::NotFound(id.0.clone()))?;
            if !component.available {
                return Err(StoreError::Conflict(format!(
                    "component {} is already reserved",
                    id.0
                )));
            }
        }
        let mut reserved = Vec::with_capacity(ids.len());
        for id in ids {
            let component = guard.get_mut(id).expect("presence checked above");
            component.available = false;
            component.reserved_for = Some(request.clone());
            component.version += 1;
            reserved.push(component.clone());
        }
        Ok(reserved)
    }

    fn release(&self, request: &RequestId) -> Result<Vec<SeparatedComponent>, StoreError> {
        let mut guard = self.records.lock().expect("component mutex poisoned");
        let mut released = Vec::new();
        for component in guard.values_mut() {
            if component.reserved_for.as_ref() == Some(request) {
                component.available = true;
                component.reserved_for = None;
                component.version += 1;
                released.push(component.clone());
            }
        }
        Ok(released)
    }

    fn available_volume(
        &self,
        blood_type: BloodType,
        kind: ComponentKind,
    ) -> Result<u32, StoreError> {
        let guard = self.records.lock().expect("component mutex poisoned");
        Ok(guard
            .values()
            .filter(|component| {
                component.available
                    && component.blood_type == blood_type
                    && component.kind == kind
            })
            .map(|component| component.volume_ml)
            .fold(0u32, u32::saturating_add))
    }
}

#[derive(Default, Clone)]
pub struct MemoryRequests {
    records: Arc<Mutex<HashMap<RequestId, BloodRequest>>>,
}

impl RequestRepository for MemoryRequests {
    fn insert(&self, request: BloodRequest) -> Result<BloodRequest, StoreError> {
        let mut guard = self.records.lock().expect("request mutex poisoned");
        let id = request.request_id.0.clone();
        cas_insert(&mut guard, request.request_id.clone(), &id, request)
    }

    fn update(&self, request: BloodRequest) -> Result<BloodRequest, StoreError> {
        let mut guard = self.records.lock().expect("request mutex poisoned");
        let id = request.request_id.0.clone();
        let read_version = request.version;
        cas_update(
            &mut guard,
            request.request_id.clone(),
            &id,
            request,
            read_version,
            |stored| stored.version,
            |value| value.version += 1,
        )
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<BloodRequest>, StoreError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<BloodRequest>, StoreError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

/// Publisher that records events for assertions and demos.
#[derive(Default, Clone)]
pub struct MemoryPublisher {
    events: Arc<Mutex<Vec<SupplyEvent>>>,
}

impl MemoryPublisher {
    pub fn events(&self) -> Vec<SupplyEvent> {
        self.events.lock().expect("publisher mutex poisoned").clone()
    }
}

impl EventPublisher for MemoryPublisher {
    fn publish(&self, event: SupplyEvent) -> Result<(), PublishError> {
        self.events
            .lock()
            .expect("publisher mutex poisoned")
            .push(event);
        Ok(())
    }
}
