use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::supply::domain::{AuditNote, BloodType, DonorId, InvalidTransition};

/// Identifier wrapper for medical profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub String);

/// Approval state gating what a donor may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityState {
    Pending,
    Available,
    Blocked,
    Complete,
}

impl EligibilityState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Available => "available",
            Self::Blocked => "blocked",
            Self::Complete => "complete",
        }
    }

    /// Blocked and complete are only re-enterable through a staff override.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Blocked | Self::Complete)
    }
}

/// Decisions medical staff can record on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Block,
    Complete,
}

impl ReviewDecision {
    pub const fn target(self) -> EligibilityState {
        match self {
            Self::Approve => EligibilityState::Available,
            Self::Block => EligibilityState::Blocked,
            Self::Complete => EligibilityState::Complete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    Unspecified,
}

/// Reachable contact details captured at the donor desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Raw intake payload before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSubmission {
    pub donor_id: DonorId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub national_id: String,
    pub contact: ContactDetails,
    pub blood_type: BloodType,
    pub disease_notes: Vec<String>,
}

/// Reviewed medical record; one per donor, never hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalProfile {
    pub profile_id: ProfileId,
    pub donor_id: DonorId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub national_id: String,
    pub contact: ContactDetails,
    pub blood_type: BloodType,
    pub donation_count: u32,
    pub disease_notes: Vec<String>,
    pub state: EligibilityState,
    pub audit: Vec<AuditNote>,
    pub version: u64,
}

impl MedicalProfile {
    /// Apply a staff review decision, enforcing the eligibility state machine:
    /// `pending -> {available, blocked}`, `available -> complete`, no
    /// self-loops, terminals closed.
    pub(crate) fn apply_review(
        &mut self,
        decision: ReviewDecision,
    ) -> Result<(), InvalidTransition> {
        let target = decision.target();
        let allowed = matches!(
            (self.state, target),
            (EligibilityState::Pending, EligibilityState::Available)
                | (EligibilityState::Pending, EligibilityState::Blocked)
                | (EligibilityState::Available, EligibilityState::Complete)
        );
        if !allowed {
            return Err(InvalidTransition {
                entity: "medical profile",
                id: self.profile_id.0.clone(),
                from: self.state.label(),
                to: target.label(),
            });
        }
        self.state = target;
        Ok(())
    }

    pub fn status_view(&self) -> ProfileStatusView {
        ProfileStatusView {
            profile_id: self.profile_id.clone(),
            donor_id: self.donor_id.clone(),
            blood_type: self.blood_type,
            state: self.state.label(),
            donation_count: self.donation_count,
        }
    }
}

/// Sanitized representation exposed over the API; no medical notes.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileStatusView {
    pub profile_id: ProfileId,
    pub donor_id: DonorId,
    pub blood_type: BloodType,
    pub state: &'static str,
    pub donation_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(state: EligibilityState) -> MedicalProfile {
        MedicalProfile {
            profile_id: ProfileId("profile-000001".to_string()),
            donor_id: DonorId("donor-42".to_string()),
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
            donation_count: 0,
            disease_notes: Vec::new(),
            state,
            audit: Vec::new(),
            version: 1,
        }
    }

    #[test]
    fn pending_profiles_can_be_approved_or_blocked() {
        let mut approved = profile(EligibilityState::Pending);
        approved
            .apply_review(ReviewDecision::Approve)
            .expect("approve from pending");
        assert_eq!(approved.state, EligibilityState::Available);

        let mut blocked = profile(EligibilityState::Pending);
        blocked
            .apply_review(ReviewDecision::Block)
            .expect("block from pending");
        assert_eq!(blocked.state, EligibilityState::Blocked);
    }

    #[test]
    fn terminal_states_reject_further_review() {
        let mut blocked = profile(EligibilityState::Blocked);
        let err = blocked
            .apply_review(ReviewDecision::Approve)
            .expect_err("blocked is terminal");
        assert_eq!(err.from, "blocked");
        assert_eq!(err.to, "available");
    }

    #[test]
    fn completion_requires_available_state() {
        let mut pending = profile(EligibilityState::Pending);
        assert!(pending.apply_review(ReviewDecision::Complete).is_err());

        let mut available = profile(EligibilityState::Available);
        available
            .apply_review(ReviewDecision::Complete)
            .expect("complete from available");
        assert_eq!(available.state, EligibilityState::Complete);
    }
}
