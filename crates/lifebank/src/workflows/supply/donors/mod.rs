//! Donor intake and medical eligibility.
//!
//! The intake guard turns a raw submission into a validated [`MedicalProfile`]
//! in state `pending`; medical staff then review it through the
//! [`EligibilityService`], which owns the `pending -> {available, blocked}`
//! and `available -> complete` state machine. A blocked profile gates the
//! registration ledger.

pub mod domain;
pub(crate) mod intake;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    ContactDetails, EligibilityState, Gender, MedicalProfile, ProfileId, ProfileStatusView,
    ProfileSubmission, ReviewDecision,
};
pub use intake::{IntakeError, IntakeGuard, IntakePolicy};
pub use repository::ProfileRepository;
pub use router::donor_router;
pub use service::{EligibilityConfig, EligibilityService, EligibilityServiceError};
