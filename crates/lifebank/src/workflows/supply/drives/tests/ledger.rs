use super::common::*;
use crate::workflows::supply::domain::DonorId;
use crate::workflows::supply::donors::{EligibilityState, ReviewDecision};
use crate::workflows::supply::drives::domain::RegistrationStatus;
use crate::workflows::supply::drives::service::RegistrationError;
use crate::workflows::supply::events::SupplyEvent;

#[test]
fn blocked_donor_cannot_register() {
    let harness = harness();
    let event_id = seeded_event(&harness);
    let profile = harness
        .eligibility
        .submit_profile(submission("donor-1"), today())
        .expect("profile stored");
    harness
        .eligibility
        .review_profile(&profile.profile_id, ReviewDecision::Block)
        .expect("block succeeds");

    match harness
        .ledger
        .register(DonorId("donor-1".to_string()), event_id, during_event())
    {
        Err(RegistrationError::Blocked { donor }) => assert_eq!(donor, "donor-1"),
        other => panic!("expected eligibility gate, got {other:?}"),
    }
}

#[test]
fn unknown_donor_cannot_register() {
    let harness = harness();
    let event_id = seeded_event(&harness);

    match harness
        .ledger
        .register(DonorId("ghost".to_string()), event_id, during_event())
    {
        Err(RegistrationError::ProfileMissing { donor }) => assert_eq!(donor, "ghost"),
        other => panic!("expected missing profile error, got {other:?}"),
    }
}

#[test]
fn duplicate_active_registration_is_rejected() {
    let harness = harness();
    let event_id = seeded_event(&harness);
    let donor = available_donor(&harness, "donor-1");

    harness
        .ledger
        .register(donor.clone(), event_id.clone(), during_event())
        .expect("first registration succeeds");

    match harness.ledger.register(donor, event_id, during_event()) {
        Err(RegistrationError::AlreadyRegistered { donor, .. }) => {
            assert_eq!(donor, "donor-1");
        }
        other => panic!("expected duplicate rejection, got {other:?}"),
    }
}

#[test]
fn cancelled_registration_frees_the_slot() {
    let harness = harness();
    let event_id = seeded_event(&harness);
    let donor = available_donor(&harness, "donor-1");

    let first = harness
        .ledger
        .register(donor.clone(), event_id.clone(), during_event())
        .expect("first registration succeeds");
    harness
        .ledger
        .change_status(&first.registration_id, RegistrationStatus::Cancelled)
        .expect("cancellation succeeds");

    harness
        .ledger
        .register(donor, event_id, during_event())
        .expect("re-registration after cancellation succeeds");
}

#[test]
fn ended_event_rejects_registration() {
    let harness = harness();
    let event_id = seeded_event(&harness);
    let donor = available_donor(&harness, "donor-1");
    let after_close = event_draft().ends_at + chrono::Duration::minutes(5);

    match harness.ledger.register(donor, event_id, after_close) {
        Err(RegistrationError::EventEnded { .. }) => {}
        other => panic!("expected ended event rejection, got {other:?}"),
    }
}

#[test]
fn completion_is_terminal_and_idempotent() {
    let harness = harness();
    let event_id = seeded_event(&harness);
    let donor = available_donor(&harness, "donor-1");
    let registration = harness
        .ledger
        .register(donor, event_id, during_event())
        .expect("registration created");

    let completed = harness
        .ledger
        .change_status(&registration.registration_id, RegistrationStatus::Completed)
        .expect("completion succeeds");
    assert_eq!(completed.status, RegistrationStatus::Completed);

    let repeated = harness
        .ledger
        .change_status(&registration.registration_id, RegistrationStatus::Completed)
        .expect("repeat completion is a no-op");
    assert_eq!(repeated.status, RegistrationStatus::Completed);
    assert_eq!(repeated.version, completed.version, "no extra write happened");

    match harness
        .ledger
        .change_status(&registration.registration_id, RegistrationStatus::Cancelled)
    {
        Err(RegistrationError::Transition(err)) => assert_eq!(err.from, "completed"),
        other => panic!("expected terminal rejection, got {other:?}"),
    }
}

#[test]
fn completion_counts_a_donation_and_notifies() {
    let harness = harness();
    let event_id = seeded_event(&harness);
    let donor = available_donor(&harness, "donor-1");
    let registration = harness
        .ledger
        .register(donor.clone(), event_id, during_event())
        .expect("registration created");

    harness
        .ledger
        .change_status(&registration.registration_id, RegistrationStatus::Completed)
        .expect("completion succeeds");

    let profile = harness
        .eligibility
        .profile_for_donor(&donor)
        .expect("fetch succeeds")
        .expect("profile present");
    assert_eq!(profile.donation_count, 1);
    assert_eq!(profile.state, EligibilityState::Available);

    let events = harness.publisher.events();
    assert!(events.iter().any(|event| matches!(
        event,
        SupplyEvent::RegistrationCompleted { registration_id, .. }
            if registration_id == &registration.registration_id
    )));

    // A second completion must not double-count the donation.
    harness
        .ledger
        .change_status(&registration.registration_id, RegistrationStatus::Completed)
        .expect("repeat is a no-op");
    let profile = harness
        .eligibility
        .profile_for_donor(&donor)
        .expect("fetch succeeds")
        .expect("profile present");
    assert_eq!(profile.donation_count, 1);
}
