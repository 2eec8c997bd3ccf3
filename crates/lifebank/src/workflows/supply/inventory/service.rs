use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::workflows::supply::domain::InvalidTransition;
use crate::workflows::supply::store::{with_retry, StoreError};

use super::domain::{BloodUnit, SeparationStatus, UnitDraft, UnitId};
use super::repository::UnitRepository;

const DEFAULT_MIN_VOLUME_ML: u32 = 50;
const DEFAULT_MAX_VOLUME_ML: u32 = 1_000;
const DEFAULT_EXPIRY_HORIZON_DAYS: i64 = 7;

/// Policy dials for unit intake and expiry reporting.
#[derive(Debug, Clone)]
pub struct InventoryPolicy {
    min_volume_ml: u32,
    max_volume_ml: u32,
    expiry_horizon_days: i64,
}

impl InventoryPolicy {
    pub fn new(min_volume_ml: u32, max_volume_ml: u32, expiry_horizon_days: i64) -> Self {
        let (min_volume_ml, max_volume_ml) = if min_volume_ml == 0 || min_volume_ml >= max_volume_ml
        {
            (DEFAULT_MIN_VOLUME_ML, DEFAULT_MAX_VOLUME_ML)
        } else {
            (min_volume_ml, max_volume_ml)
        };
        Self {
            min_volume_ml,
            max_volume_ml,
            expiry_horizon_days: expiry_horizon_days.max(1),
        }
    }

    pub fn min_volume_ml(&self) -> u32 {
        self.min_volume_ml
    }

    pub fn max_volume_ml(&self) -> u32 {
        self.max_volume_ml
    }

    pub fn expiry_horizon_days(&self) -> i64 {
        self.expiry_horizon_days
    }

    /// Check an intake draft against the policy and the date invariant.
    pub fn validate(&self, draft: &UnitDraft) -> Result<(), UnitIntakeError> {
        if !(self.min_volume_ml..=self.max_volume_ml).contains(&draft.volume_ml) {
            return Err(UnitIntakeError::VolumeOutOfRange {
                found: draft.volume_ml,
                min: self.min_volume_ml,
                max: self.max_volume_ml,
            });
        }
        if draft.expires_on <= draft.collected_on {
            return Err(UnitIntakeError::ExpiryBeforeCollection {
                collected_on: draft.collected_on,
                expires_on: draft.expires_on,
            });
        }
        Ok(())
    }
}

impl Default for InventoryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MIN_VOLUME_ML,
            DEFAULT_MAX_VOLUME_ML,
            DEFAULT_EXPIRY_HORIZON_DAYS,
        )
    }
}

/// Validation errors raised at unit intake.
#[derive(Debug, thiserror::Error)]
pub enum UnitIntakeError {
    #[error("volume {found} mL is outside the accepted {min}-{max} mL range")]
    VolumeOutOfRange { found: u32, min: u32, max: u32 },
    #[error("expiry {expires_on} must fall after collection {collected_on}")]
    ExpiryBeforeCollection {
        collected_on: NaiveDate,
        expires_on: NaiveDate,
    },
}

static UNIT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_unit_id() -> UnitId {
    let id = UNIT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UnitId(format!("unit-{id:06}"))
}

/// Service owning unit intake and the separation status machine.
pub struct UnitInventory<U> {
    units: Arc<U>,
    policy: InventoryPolicy,
}

impl<U> UnitInventory<U>
where
    U: UnitRepository + 'static,
{
    pub fn new(units: Arc<U>, policy: InventoryPolicy) -> Self {
        Self { units, policy }
    }

    pub fn policy(&self) -> &InventoryPolicy {
        &self.policy
    }

    /// Register a collected unit in state `unprocessed`.
    pub fn intake_unit(&self, draft: UnitDraft) -> Result<BloodUnit, InventoryError> {
        self.policy.validate(&draft)?;
        let unit = BloodUnit {
            unit_id: next_unit_id(),
            donor_id: draft.donor_id,
            registration_id: draft.registration_id,
            blood_type: draft.blood_type,
            volume_ml: draft.volume_ml,
            collected_on: draft.collected_on,
            expires_on: draft.expires_on,
            separation: SeparationStatus::Unprocessed,
            failure_reason: None,
            audit: Vec::new(),
            version: 1,
        };
        let stored = with_retry(|| self.units.insert(unit.clone()))?;
        tracing::info!(unit = %stored.unit_id.0, blood_type = %stored.blood_type, "blood unit collected");
        Ok(stored)
    }

    /// Claim a unit for separation; rejects anything not `unprocessed`, which
    /// is the guard against double separation.
    pub fn mark_separating(&self, id: &UnitId) -> Result<BloodUnit, InventoryError> {
        self.transition(id, BloodUnit::begin_separation)
    }

    /// Complete a separation started with [`Self::mark_separating`].
    pub fn mark_separated(&self, id: &UnitId) -> Result<BloodUnit, InventoryError> {
        self.transition(id, BloodUnit::finish_separation)
    }

    /// Record a failed separation attempt with the reason.
    pub fn mark_error(&self, id: &UnitId, reason: String) -> Result<BloodUnit, InventoryError> {
        let unit = self.transition(id, move |unit| unit.fail_separation(reason.clone()))?;
        tracing::warn!(unit = %unit.unit_id.0, "separation failed");
        Ok(unit)
    }

    /// Staff retry of a failed unit back to `unprocessed`; requires an audit
    /// note.
    pub fn retry_error(
        &self,
        id: &UnitId,
        note: &str,
        now: NaiveDateTime,
    ) -> Result<BloodUnit, InventoryError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(InventoryError::AuditNoteRequired);
        }
        let note = note.to_string();
        self.transition(id, move |unit| {
            unit.reset_after_error(note.clone(), now)
        })
    }

    pub fn fetch_unit(&self, id: &UnitId) -> Result<BloodUnit, InventoryError> {
        Ok(with_retry(|| self.units.fetch(id))?
            .ok_or_else(|| StoreError::NotFound(id.0.clone()))?)
    }

    pub fn list_units(&self) -> Result<Vec<BloodUnit>, InventoryError> {
        Ok(with_retry(|| self.units.list())?)
    }

    fn transition(
        &self,
        id: &UnitId,
        apply: impl Fn(&mut BloodUnit) -> Result<(), InvalidTransition>,
    ) -> Result<BloodUnit, InventoryError> {
        let mut unit = self.fetch_unit(id)?;
        apply(&mut unit)?;
        let updated = with_retry(|| self.units.update(unit.clone()))?;
        tracing::info!(unit = %updated.unit_id.0, status = updated.separation.label(), "unit status changed");
        Ok(updated)
    }
}

/// Error raised by the unit inventory.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error(transparent)]
    Intake(#[from] UnitIntakeError),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("an audit note is required to retry a failed unit")]
    AuditNoteRequired,
    #[error(transparent)]
    Store(#[from] StoreError),
}
