use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::workflows::supply::domain::{AuditNote, DonorId, InvalidTransition};
use crate::workflows::supply::store::{with_retry, StoreError};

use super::domain::{
    EligibilityState, MedicalProfile, ProfileId, ProfileSubmission, ReviewDecision,
};
use super::intake::{IntakeError, IntakeGuard, IntakePolicy};
use super::repository::ProfileRepository;

/// Eligibility dials: intake age floor and the donation count at which an
/// available donor is retired to `complete`.
#[derive(Debug, Clone)]
pub struct EligibilityConfig {
    pub minimum_age_years: u32,
    pub donations_to_complete: u32,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            minimum_age_years: 17,
            donations_to_complete: 50,
        }
    }
}

static PROFILE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_profile_id() -> ProfileId {
    let id = PROFILE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProfileId(format!("profile-{id:06}"))
}

/// Service owning profile intake and the eligibility state machine.
pub struct EligibilityService<R> {
    guard: IntakeGuard,
    repository: Arc<R>,
    donations_to_complete: u32,
}

impl<R> EligibilityService<R>
where
    R: ProfileRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: EligibilityConfig) -> Self {
        Self {
            guard: IntakeGuard::with_policy(IntakePolicy::new(config.minimum_age_years)),
            repository,
            donations_to_complete: config.donations_to_complete.max(1),
        }
    }

    /// Validate and persist a new donor profile in state `pending`.
    pub fn submit_profile(
        &self,
        submission: ProfileSubmission,
        today: NaiveDate,
    ) -> Result<MedicalProfile, EligibilityServiceError> {
        let mut profile = self.guard.profile_from_submission(submission, today)?;
        profile.profile_id = next_profile_id();
        let stored = with_retry(|| self.repository.insert(profile.clone()))?;
        tracing::info!(profile = %stored.profile_id.0, donor = %stored.donor_id.0, "donor profile submitted");
        Ok(stored)
    }

    /// Record a staff review decision through the state machine.
    pub fn review_profile(
        &self,
        id: &ProfileId,
        decision: ReviewDecision,
    ) -> Result<MedicalProfile, EligibilityServiceError> {
        let mut profile = self.fetch_required(id)?;
        profile.apply_review(decision)?;
        let updated = with_retry(|| self.repository.update(profile.clone()))?;
        tracing::info!(profile = %updated.profile_id.0, state = updated.state.label(), "profile reviewed");
        Ok(updated)
    }

    /// Force a profile into `target` regardless of the state machine. Requires
    /// a note; the override is logged and recorded on the profile's audit
    /// trail.
    pub fn override_state(
        &self,
        id: &ProfileId,
        target: EligibilityState,
        note: &str,
        now: NaiveDateTime,
    ) -> Result<MedicalProfile, EligibilityServiceError> {
        if note.trim().is_empty() {
            return Err(EligibilityServiceError::OverrideNoteRequired);
        }
        let mut profile = self.fetch_required(id)?;
        tracing::warn!(
            profile = %profile.profile_id.0,
            from = profile.state.label(),
            to = target.label(),
            "staff override of eligibility state"
        );
        profile.state = target;
        profile.audit.push(AuditNote {
            at: now,
            note: format!("state override to {}: {}", target.label(), note.trim()),
        });
        let updated = with_retry(|| self.repository.update(profile.clone()))?;
        Ok(updated)
    }

    /// Count a completed donation; an available donor reaching the policy
    /// threshold moves to `complete`.
    pub fn record_donation(
        &self,
        id: &ProfileId,
    ) -> Result<MedicalProfile, EligibilityServiceError> {
        let mut profile = self.fetch_required(id)?;
        profile.donation_count += 1;
        if profile.state == EligibilityState::Available
            && profile.donation_count >= self.donations_to_complete
        {
            profile.apply_review(ReviewDecision::Complete)?;
        }
        let updated = with_retry(|| self.repository.update(profile.clone()))?;
        Ok(updated)
    }

    pub fn get(&self, id: &ProfileId) -> Result<MedicalProfile, EligibilityServiceError> {
        self.fetch_required(id)
    }

    pub fn profile_for_donor(
        &self,
        donor_id: &DonorId,
    ) -> Result<Option<MedicalProfile>, EligibilityServiceError> {
        Ok(with_retry(|| self.repository.fetch_by_donor(donor_id))?)
    }

    fn fetch_required(&self, id: &ProfileId) -> Result<MedicalProfile, EligibilityServiceError> {
        with_retry(|| self.repository.fetch(id))?
            .ok_or_else(|| StoreError::NotFound(id.0.clone()).into())
    }
}

/// Error raised by the eligibility service.
#[derive(Debug, thiserror::Error)]
pub enum EligibilityServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("an override note is required when forcing a profile state")]
    OverrideNoteRequired,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::supply::domain::BloodType;
    use crate::workflows::supply::donors::domain::{ContactDetails, Gender};
    use crate::workflows::supply::memory::MemoryProfiles;

    fn submission(donor: &str) -> ProfileSubmission {
        ProfileSubmission {
            donor_id: DonorId(donor.to_string()),
            full_name: "Kofi Mensah".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1988, 11, 2).expect("valid date"),
            gender: Gender::Male,
            national_id: "NID-1040".to_string(),
            contact: ContactDetails {
                email: "kofi@example.org".to_string(),
                phone: "0241234567".to_string(),
                address: "4 Harbour Ln".to_string(),
            },
            blood_type: BloodType::APositive,
            disease_notes: Vec::new(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
    }

    fn now() -> NaiveDateTime {
        today().and_hms_opt(9, 30, 0).expect("valid time")
    }

    fn service() -> EligibilityService<MemoryProfiles> {
        EligibilityService::new(
            Arc::new(MemoryProfiles::default()),
            EligibilityConfig {
                minimum_age_years: 17,
                donations_to_complete: 2,
            },
        )
    }

    #[test]
    fn submit_then_approve_makes_donor_available() {
        let service = service();
        let profile = service
            .submit_profile(submission("donor-1"), today())
            .expect("submission stored");
        assert_eq!(profile.state, EligibilityState::Pending);

        let reviewed = service
            .review_profile(&profile.profile_id, ReviewDecision::Approve)
            .expect("approve succeeds");
        assert_eq!(reviewed.state, EligibilityState::Available);
    }

    #[test]
    fn second_profile_for_same_donor_is_rejected() {
        let service = service();
        service
            .submit_profile(submission("donor-1"), today())
            .expect("first profile stored");
        match service.submit_profile(submission("donor-1"), today()) {
            Err(EligibilityServiceError::Store(StoreError::Duplicate(_))) => {}
            other => panic!("expected duplicate donor rejection, got {other:?}"),
        }
    }

    #[test]
    fn review_on_terminal_state_is_an_invalid_transition() {
        let service = service();
        let profile = service
            .submit_profile(submission("donor-1"), today())
            .expect("submission stored");
        service
            .review_profile(&profile.profile_id, ReviewDecision::Block)
            .expect("block succeeds");

        match service.review_profile(&profile.profile_id, ReviewDecision::Approve) {
            Err(EligibilityServiceError::Transition(err)) => {
                assert_eq!(err.from, "blocked");
            }
            other => panic!("expected invalid transition, got {other:?}"),
        }
    }

    #[test]
    fn override_requires_note_and_records_audit_entry() {
        let service = service();
        let profile = service
            .submit_profile(submission("donor-1"), today())
            .expect("submission stored");
        service
            .review_profile(&profile.profile_id, ReviewDecision::Block)
            .expect("block succeeds");

        assert!(matches!(
            service.override_state(
                &profile.profile_id,
                EligibilityState::Available,
                "  ",
                now()
            ),
            Err(EligibilityServiceError::OverrideNoteRequired)
        ));

        let overridden = service
            .override_state(
                &profile.profile_id,
                EligibilityState::Available,
                "cleared after repeat screening",
                now(),
            )
            .expect("override succeeds");
        assert_eq!(overridden.state, EligibilityState::Available);
        assert_eq!(overridden.audit.len(), 1);
        assert!(overridden.audit[0].note.contains("repeat screening"));
    }

    #[test]
    fn donation_threshold_retires_available_donor() {
        let service = service();
        let profile = service
            .submit_profile(submission("donor-1"), today())
            .expect("submission stored");
        service
            .review_profile(&profile.profile_id, ReviewDecision::Approve)
            .expect("approve succeeds");

        let first = service
            .record_donation(&profile.profile_id)
            .expect("first donation");
        assert_eq!(first.state, EligibilityState::Available);
        assert_eq!(first.donation_count, 1);

        let second = service
            .record_donation(&profile.profile_id)
            .expect("second donation");
        assert_eq!(second.state, EligibilityState::Complete);
        assert_eq!(second.donation_count, 2);
    }

    #[test]
    fn missing_profile_surfaces_not_found() {
        let service = service();
        match service.get(&ProfileId("profile-999999".to_string())) {
            Err(EligibilityServiceError::Store(StoreError::NotFound(_))) => {}
            other => panic!("expected not found, got {other:?}"),
        }
    }
}
