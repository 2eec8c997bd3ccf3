use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::workflows::supply::domain::{DonorId, InvalidTransition};
use crate::workflows::supply::donors::{
    EligibilityService, EligibilityServiceError, EligibilityState, ProfileRepository,
};
use crate::workflows::supply::events::{EventPublisher, SupplyEvent};
use crate::workflows::supply::store::{with_retry, StoreError};

use super::domain::{
    DonationEvent, EventDraft, EventId, EventStatus, EventValidationError, EventView,
    Registration, RegistrationId, RegistrationStatus,
};
use super::repository::{EventRepository, RegistrationRepository};

static EVENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static REGISTRATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_event_id() -> EventId {
    let id = EVENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EventId(format!("event-{id:06}"))
}

fn next_registration_id() -> RegistrationId {
    let id = REGISTRATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RegistrationId(format!("reg-{id:06}"))
}

/// Staff-facing management of donation events.
pub struct EventRegistry<E, R> {
    events: Arc<E>,
    registrations: Arc<R>,
}

impl<E, R> EventRegistry<E, R>
where
    E: EventRepository + 'static,
    R: RegistrationRepository + 'static,
{
    pub fn new(events: Arc<E>, registrations: Arc<R>) -> Self {
        Self {
            events,
            registrations,
        }
    }

    pub fn create_event(&self, draft: EventDraft) -> Result<DonationEvent, EventRegistryError> {
        draft.validate()?;
        let event = DonationEvent {
            event_id: next_event_id(),
            title: draft.title,
            location: draft.location,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            description: draft.description,
            version: 1,
        };
        let stored = with_retry(|| self.events.insert(event.clone()))?;
        tracing::info!(event = %stored.event_id.0, "donation event created");
        Ok(stored)
    }

    pub fn update_event(
        &self,
        id: &EventId,
        draft: EventDraft,
    ) -> Result<DonationEvent, EventRegistryError> {
        draft.validate()?;
        let mut event = self.fetch_required(id)?;
        event.title = draft.title;
        event.location = draft.location;
        event.starts_at = draft.starts_at;
        event.ends_at = draft.ends_at;
        event.description = draft.description;
        Ok(with_retry(|| self.events.update(event.clone()))?)
    }

    /// Delete an event. Open (pending) registrations block deletion unless
    /// `force` is set, in which case they cascade to `cancelled`. Events with
    /// completed registrations are historical facts and are never deletable.
    pub fn delete_event(&self, id: &EventId, force: bool) -> Result<(), EventRegistryError> {
        let event = self.fetch_required(id)?;
        let registrations = with_retry(|| self.registrations.list_for_event(id))?;

        if registrations
            .iter()
            .any(|registration| registration.status == RegistrationStatus::Completed)
        {
            return Err(EventRegistryError::CompletedRegistrations {
                event: id.0.clone(),
            });
        }

        let open: Vec<&Registration> = registrations
            .iter()
            .filter(|registration| registration.status == RegistrationStatus::Pending)
            .collect();
        if !open.is_empty() {
            if !force {
                return Err(EventRegistryError::OpenRegistrations {
                    event: id.0.clone(),
                    count: open.len(),
                });
            }
            for registration in open {
                let mut cancelled = registration.clone();
                if cancelled.transition(RegistrationStatus::Cancelled)? {
                    with_retry(|| self.registrations.update(cancelled.clone()))?;
                }
            }
            tracing::warn!(event = %id.0, "force-deleting event cascaded open registrations to cancelled");
        }

        with_retry(|| self.events.delete(&event.event_id))?;
        Ok(())
    }

    pub fn get(&self, id: &EventId) -> Result<DonationEvent, EventRegistryError> {
        self.fetch_required(id)
    }

    pub fn list_events(&self, now: NaiveDateTime) -> Result<Vec<EventView>, EventRegistryError> {
        let mut events = with_retry(|| self.events.list())?;
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(events.iter().map(|event| event.view_at(now)).collect())
    }

    fn fetch_required(&self, id: &EventId) -> Result<DonationEvent, EventRegistryError> {
        with_retry(|| self.events.fetch(id))?
            .ok_or_else(|| StoreError::NotFound(id.0.clone()).into())
    }
}

/// Error raised by the event registry.
#[derive(Debug, thiserror::Error)]
pub enum EventRegistryError {
    #[error(transparent)]
    Validation(#[from] EventValidationError),
    #[error("event {event} still has {count} open registration(s)")]
    OpenRegistrations { event: String, count: usize },
    #[error("event {event} has completed registrations and cannot be deleted")]
    CompletedRegistrations { event: String },
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The registration ledger: links donors to events under the eligibility gate
/// and owns the `pending -> {completed, cancelled}` machine.
pub struct RegistrationLedger<R, E, P, N> {
    registrations: Arc<R>,
    events: Arc<E>,
    eligibility: Arc<EligibilityService<P>>,
    publisher: Arc<N>,
}

impl<R, E, P, N> RegistrationLedger<R, E, P, N>
where
    R: RegistrationRepository + 'static,
    E: EventRepository + 'static,
    P: ProfileRepository + 'static,
    N: EventPublisher + 'static,
{
    pub fn new(
        registrations: Arc<R>,
        events: Arc<E>,
        eligibility: Arc<EligibilityService<P>>,
        publisher: Arc<N>,
    ) -> Self {
        Self {
            registrations,
            events,
            eligibility,
            publisher,
        }
    }

    /// Register a donor for an event, enforcing the eligibility gate, the
    /// event window, and the one-active-registration rule.
    pub fn register(
        &self,
        donor_id: DonorId,
        event_id: EventId,
        now: NaiveDateTime,
    ) -> Result<Registration, RegistrationError> {
        let profile = self
            .eligibility
            .profile_for_donor(&donor_id)?
            .ok_or_else(|| RegistrationError::ProfileMissing {
                donor: donor_id.0.clone(),
            })?;
        if profile.state == EligibilityState::Blocked {
            return Err(RegistrationError::Blocked {
                donor: donor_id.0.clone(),
            });
        }

        let event = with_retry(|| self.events.fetch(&event_id))?
            .ok_or_else(|| StoreError::NotFound(event_id.0.clone()))?;
        if event.status_at(now) == EventStatus::Ended {
            return Err(RegistrationError::EventEnded {
                event: event_id.0.clone(),
            });
        }

        if with_retry(|| self.registrations.fetch_active(&donor_id, &event_id))?.is_some() {
            return Err(RegistrationError::AlreadyRegistered {
                donor: donor_id.0.clone(),
                event: event_id.0.clone(),
            });
        }

        let registration = Registration {
            registration_id: next_registration_id(),
            donor_id: donor_id.clone(),
            event_id: event_id.clone(),
            registered_at: now,
            status: RegistrationStatus::Pending,
            version: 1,
        };
        let stored = match with_retry(|| self.registrations.insert(registration.clone())) {
            Ok(stored) => stored,
            // The repository guards the donor+event pair under its own lock;
            // losing that race reads the same as finding the duplicate above.
            Err(StoreError::Duplicate(_)) => {
                return Err(RegistrationError::AlreadyRegistered {
                    donor: donor_id.0,
                    event: event_id.0,
                })
            }
            Err(err) => return Err(err.into()),
        };
        tracing::info!(
            registration = %stored.registration_id.0,
            donor = %stored.donor_id.0,
            event = %stored.event_id.0,
            "registration created"
        );
        Ok(stored)
    }

    /// Drive a registration to `completed` or `cancelled`. Completion records
    /// the donation on the profile and emits `RegistrationCompleted`.
    pub fn change_status(
        &self,
        id: &RegistrationId,
        target: RegistrationStatus,
    ) -> Result<Registration, RegistrationError> {
        let mut registration = with_retry(|| self.registrations.fetch(id))?
            .ok_or_else(|| StoreError::NotFound(id.0.clone()))?;
        if !registration.transition(target)? {
            return Ok(registration);
        }

        let updated = with_retry(|| self.registrations.update(registration.clone()))?;

        if target == RegistrationStatus::Completed {
            if let Some(profile) = self.eligibility.profile_for_donor(&updated.donor_id)? {
                self.eligibility.record_donation(&profile.profile_id)?;
            }
            let event = SupplyEvent::RegistrationCompleted {
                registration_id: updated.registration_id.clone(),
                donor_id: updated.donor_id.clone(),
                event_id: updated.event_id.clone(),
            };
            if let Err(err) = self.publisher.publish(event) {
                tracing::warn!(error = %err, "registration completion notification failed");
            }
        }

        tracing::info!(
            registration = %updated.registration_id.0,
            status = updated.status.label(),
            "registration status changed"
        );
        Ok(updated)
    }

    pub fn get(&self, id: &RegistrationId) -> Result<Registration, RegistrationError> {
        Ok(with_retry(|| self.registrations.fetch(id))?
            .ok_or_else(|| StoreError::NotFound(id.0.clone()))?)
    }
}

/// Error raised by the registration ledger.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("donor {donor} has no medical profile on file")]
    ProfileMissing { donor: String },
    #[error("donor {donor} is medically blocked from registering")]
    Blocked { donor: String },
    #[error("donor {donor} already has an active registration for event {event}")]
    AlreadyRegistered { donor: String, event: String },
    #[error("event {event} has already ended")]
    EventEnded { event: String },
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Eligibility(#[from] EligibilityServiceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
