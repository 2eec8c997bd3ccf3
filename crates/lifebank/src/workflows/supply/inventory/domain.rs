use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::workflows::supply::domain::{
    AuditNote, BloodType, ComponentKind, DonorId, InvalidTransition,
};
use crate::workflows::supply::drives::domain::RegistrationId;
use crate::workflows::supply::requests::domain::RequestId;

/// Identifier wrapper for collected blood units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub String);

/// Identifier wrapper for separated components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub String);

/// Separation lifecycle of a unit. Independent of stock levels; this axis
/// tracks processing progress only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparationStatus {
    Unprocessed,
    Processing,
    Processed,
    Error,
}

impl SeparationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unprocessed => "unprocessed",
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Error => "error",
        }
    }
}

/// A physical collected unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodUnit {
    pub unit_id: UnitId,
    pub donor_id: Option<DonorId>,
    pub registration_id: Option<RegistrationId>,
    pub blood_type: BloodType,
    pub volume_ml: u32,
    pub collected_on: NaiveDate,
    pub expires_on: NaiveDate,
    pub separation: SeparationStatus,
    pub failure_reason: Option<String>,
    pub audit: Vec<AuditNote>,
    pub version: u64,
}

impl BloodUnit {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today >= self.expires_on
    }

    /// `unprocessed -> processing`; the only entry point into separation, and
    /// reachable at most once in a unit's life.
    pub(crate) fn begin_separation(&mut self) -> Result<(), InvalidTransition> {
        self.step(SeparationStatus::Unprocessed, SeparationStatus::Processing)
    }

    /// `processing -> processed`.
    pub(crate) fn finish_separation(&mut self) -> Result<(), InvalidTransition> {
        self.step(SeparationStatus::Processing, SeparationStatus::Processed)
    }

    /// `processing -> error`, recording why.
    pub(crate) fn fail_separation(&mut self, reason: String) -> Result<(), InvalidTransition> {
        self.step(SeparationStatus::Processing, SeparationStatus::Error)?;
        self.failure_reason = Some(reason);
        Ok(())
    }

    /// `error -> unprocessed`, staff-audited retry path.
    pub(crate) fn reset_after_error(
        &mut self,
        note: String,
        at: NaiveDateTime,
    ) -> Result<(), InvalidTransition> {
        self.step(SeparationStatus::Error, SeparationStatus::Unprocessed)?;
        self.failure_reason = None;
        self.audit.push(AuditNote { at, note });
        Ok(())
    }

    fn step(
        &mut self,
        from: SeparationStatus,
        to: SeparationStatus,
    ) -> Result<(), InvalidTransition> {
        if self.separation != from {
            return Err(InvalidTransition {
                entity: "blood unit",
                id: self.unit_id.0.clone(),
                from: self.separation.label(),
                to: to.label(),
            });
        }
        self.separation = to;
        Ok(())
    }
}

/// Intake fields for a collected unit, from a completed registration or a
/// manual desk entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDraft {
    #[serde(default)]
    pub donor_id: Option<DonorId>,
    #[serde(default)]
    pub registration_id: Option<RegistrationId>,
    pub blood_type: BloodType,
    pub volume_ml: u32,
    pub collected_on: NaiveDate,
    pub expires_on: NaiveDate,
}

/// A typed fraction of a separated unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparatedComponent {
    pub component_id: ComponentId,
    pub unit_id: UnitId,
    pub blood_type: BloodType,
    pub kind: ComponentKind,
    pub volume_ml: u32,
    pub separated_at: NaiveDateTime,
    pub expires_on: Option<NaiveDate>,
    pub available: bool,
    pub reserved_for: Option<RequestId>,
    pub version: u64,
}

impl SeparatedComponent {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on
            .map(|expires_on| today >= expires_on)
            .unwrap_or(false)
    }
}

/// One planned fraction handed to the separation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub kind: ComponentKind,
    pub volume_ml: u32,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}
