use chrono::{Datelike, NaiveDate};

use super::domain::{EligibilityState, MedicalProfile, ProfileId, ProfileSubmission};

/// Validation errors raised by the intake guard.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("required field {0} is missing")]
    MissingField(&'static str),
    #[error("email '{0}' is not a valid address")]
    InvalidEmail(String),
    #[error("phone '{0}' is not a dialable number")]
    InvalidPhone(String),
    #[error("donor must be at least {minimum} on intake (was {actual})")]
    UnderMinimumAge { minimum: u32, actual: u32 },
}

const DEFAULT_MINIMUM_AGE_YEARS: u32 = 17;

/// Policy dial backing intake validation.
#[derive(Debug, Clone)]
pub struct IntakePolicy {
    minimum_age_years: u32,
}

impl IntakePolicy {
    pub fn new(minimum_age_years: u32) -> Self {
        let sanitized = if minimum_age_years == 0 {
            DEFAULT_MINIMUM_AGE_YEARS
        } else {
            minimum_age_years
        };
        Self {
            minimum_age_years: sanitized,
        }
    }

    pub fn minimum_age_years(&self) -> u32 {
        self.minimum_age_years
    }
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_AGE_YEARS)
    }
}

/// Guard responsible for producing `MedicalProfile` instances.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard {
    policy: IntakePolicy,
}

impl IntakeGuard {
    pub fn with_policy(policy: IntakePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    /// Convert an inbound submission into a pending medical profile.
    pub fn profile_from_submission(
        &self,
        submission: ProfileSubmission,
        today: NaiveDate,
    ) -> Result<MedicalProfile, IntakeError> {
        if submission.full_name.trim().is_empty() {
            return Err(IntakeError::MissingField("full_name"));
        }
        if submission.national_id.trim().is_empty() {
            return Err(IntakeError::MissingField("national_id"));
        }

        let email = submission.contact.email.trim();
        if email.is_empty() {
            return Err(IntakeError::MissingField("email"));
        }
        if !is_valid_email(email) {
            return Err(IntakeError::InvalidEmail(email.to_string()));
        }

        let phone = submission.contact.phone.trim();
        if phone.is_empty() {
            return Err(IntakeError::MissingField("phone"));
        }
        if !is_valid_phone(phone) {
            return Err(IntakeError::InvalidPhone(phone.to_string()));
        }

        let actual = age_on(submission.date_of_birth, today);
        if actual < self.policy.minimum_age_years {
            return Err(IntakeError::UnderMinimumAge {
                minimum: self.policy.minimum_age_years,
                actual,
            });
        }

        Ok(MedicalProfile {
            profile_id: ProfileId("pending".to_string()),
            donor_id: submission.donor_id,
            full_name: submission.full_name,
            date_of_birth: submission.date_of_birth,
            gender: submission.gender,
            national_id: submission.national_id,
            contact: submission.contact,
            blood_type: submission.blood_type,
            donation_count: 0,
            disease_notes: submission.disease_notes,
            state: EligibilityState::Pending,
            audit: Vec::new(),
            version: 1,
        })
    }
}

fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_valid_phone(value: &str) -> bool {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = stripped.strip_prefix('+').unwrap_or(&stripped);
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}
