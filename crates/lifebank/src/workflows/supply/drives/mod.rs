//! Donation drives: time-boxed events and the registration ledger.
//!
//! Event status (upcoming / ongoing / ended) is always derived from the clock,
//! never persisted. Registrations gate on the donor's eligibility profile and
//! close into the terminal `completed` / `cancelled` states; completion counts
//! a donation on the profile and notifies the dispatcher.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    DonationEvent, EventDraft, EventId, EventStatus, EventValidationError, EventView,
    Registration, RegistrationId, RegistrationStatus,
};
pub use repository::{EventRepository, RegistrationRepository};
pub use router::drive_router;
pub use service::{EventRegistry, EventRegistryError, RegistrationError, RegistrationLedger};
