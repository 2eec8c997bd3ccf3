use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::workflows::supply::domain::{BloodType, DonorId};
use crate::workflows::supply::donors::domain::{ContactDetails, Gender, ProfileSubmission};
use crate::workflows::supply::donors::{EligibilityConfig, EligibilityService, ReviewDecision};
use crate::workflows::supply::drives::domain::{EventDraft, EventId};
use crate::workflows::supply::drives::service::{EventRegistry, RegistrationLedger};
use crate::workflows::supply::memory::{
    MemoryEvents, MemoryProfiles, MemoryPublisher, MemoryRegistrations,
};

pub(super) type Ledger =
    RegistrationLedger<MemoryRegistrations, MemoryEvents, MemoryProfiles, MemoryPublisher>;
pub(super) type Registry = EventRegistry<MemoryEvents, MemoryRegistrations>;

pub(super) struct Harness {
    pub(super) registry: Arc<Registry>,
    pub(super) ledger: Arc<Ledger>,
    pub(super) eligibility: Arc<EligibilityService<MemoryProfiles>>,
    pub(super) publisher: Arc<MemoryPublisher>,
}

pub(super) fn harness() -> Harness {
    let profiles = Arc::new(MemoryProfiles::default());
    let events = Arc::new(MemoryEvents::default());
    let registrations = Arc::new(MemoryRegistrations::default());
    let publisher = Arc::new(MemoryPublisher::default());
    let eligibility = Arc::new(EligibilityService::new(
        profiles,
        EligibilityConfig::default(),
    ));
    let registry = Arc::new(EventRegistry::new(events.clone(), registrations.clone()));
    let ledger = Arc::new(RegistrationLedger::new(
        registrations,
        events,
        eligibility.clone(),
        publisher.clone(),
    ));
    Harness {
        registry,
        ledger,
        eligibility,
        publisher,
    }
}

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 10).expect("valid date")
}

pub(super) fn during_event() -> NaiveDateTime {
    today().and_hms_opt(10, 0, 0).expect("valid time")
}

pub(super) fn event_draft() -> EventDraft {
    EventDraft {
        title: "City Hall Drive".to_string(),
        location: "City Hall Atrium".to_string(),
        starts_at: today().and_hms_opt(8, 0, 0).expect("valid time"),
        ends_at: today().and_hms_opt(16, 0, 0).expect("valid time"),
        description: "Quarterly community drive".to_string(),
    }
}

pub(super) fn submission(donor: &str) -> ProfileSubmission {
    ProfileSubmission {
        donor_id: DonorId(donor.to_string()),
        full_name: "Amara Osei".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 3, 14).expect("valid date"),
        gender: Gender::Female,
        national_id: "NID-5521".to_string(),
        contact: ContactDetails {
            email: "amara@example.org".to_string(),
            phone: "+233201234567".to_string(),
            address: "12 Ridge Rd".to_string(),
        },
        blood_type: BloodType::ONegative,
        disease_notes: Vec::new(),
    }
}

/// Seed a donor profile in `available` state and return its donor id.
pub(super) fn available_donor(harness: &Harness, donor: &str) -> DonorId {
    let profile = harness
        .eligibility
        .submit_profile(submission(donor), today())
        .expect("profile stored");
    harness
        .eligibility
        .review_profile(&profile.profile_id, ReviewDecision::Approve)
        .expect("approve succeeds");
    DonorId(donor.to_string())
}

pub(super) fn seeded_event(harness: &Harness) -> EventId {
    harness
        .registry
        .create_event(event_draft())
        .expect("event created")
        .event_id
}
