use crate::workflows::supply::domain::DonorId;
use crate::workflows::supply::store::StoreError;

use super::domain::{DonationEvent, EventId, Registration, RegistrationId};

/// Storage seam for donation events.
pub trait EventRepository: Send + Sync {
    fn insert(&self, event: DonationEvent) -> Result<DonationEvent, StoreError>;
    fn update(&self, event: DonationEvent) -> Result<DonationEvent, StoreError>;
    fn fetch(&self, id: &EventId) -> Result<Option<DonationEvent>, StoreError>;
    fn list(&self) -> Result<Vec<DonationEvent>, StoreError>;
    fn delete(&self, id: &EventId) -> Result<(), StoreError>;
}

/// Storage seam for registrations. `insert` rejects a second active
/// (non-cancelled) registration for the same donor and event under the same
/// lock that stores the first, so racing staff resolve to one winner.
pub trait RegistrationRepository: Send + Sync {
    fn insert(&self, registration: Registration) -> Result<Registration, StoreError>;
    fn update(&self, registration: Registration) -> Result<Registration, StoreError>;
    fn fetch(&self, id: &RegistrationId) -> Result<Option<Registration>, StoreError>;
    fn fetch_active(
        &self,
        donor_id: &DonorId,
        event_id: &EventId,
    ) -> Result<Option<Registration>, StoreError>;
    fn list_for_event(&self, event_id: &EventId) -> Result<Vec<Registration>, StoreError>;
}
