use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::workflows::supply::domain::{BloodType, ComponentKind, InvalidTransition, Urgency};
use crate::workflows::supply::inventory::domain::ComponentId;

/// Identifier wrapper for hospital blood requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

/// Request lifecycle. `rejected` and `fulfilled` are terminal;
/// `waiting_payment` holds a partial reservation pending confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    WaitingPayment,
    Rejected,
    Fulfilled,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::WaitingPayment => "waiting_payment",
            Self::Rejected => "rejected",
            Self::Fulfilled => "fulfilled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Fulfilled)
    }
}

/// Staff adjudication of a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub const fn target(self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Reject => RequestStatus::Rejected,
        }
    }
}

/// A hospital's need for blood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodRequest {
    pub request_id: RequestId,
    pub patient_name: String,
    pub hospital: String,
    pub blood_type: BloodType,
    pub component: ComponentKind,
    pub volume_ml: u32,
    pub urgency: Urgency,
    pub reason: String,
    pub status: RequestStatus,
    pub requested_at: NaiveDateTime,
    pub reserved: Vec<ComponentId>,
    pub reserved_ml: u32,
    pub version: u64,
}

impl BloodRequest {
    /// Apply a staff decision. Repeating the decision the request already
    /// carries is a no-op (`Ok(false)`) so flaky-network retries stay safe;
    /// anything else away from `pending` is rejected.
    pub(crate) fn apply_decision(
        &mut self,
        decision: Decision,
    ) -> Result<bool, InvalidTransition> {
        let target = decision.target();
        if self.status == target {
            return Ok(false);
        }
        if self.status != RequestStatus::Pending {
            return Err(InvalidTransition {
                entity: "blood request",
                id: self.request_id.0.clone(),
                from: self.status.label(),
                to: target.label(),
            });
        }
        self.status = target;
        Ok(true)
    }

    pub fn status_view(&self) -> RequestStatusView {
        RequestStatusView {
            request_id: self.request_id.clone(),
            hospital: self.hospital.clone(),
            status: self.status.label(),
            requested_ml: self.volume_ml,
            reserved_ml: self.reserved_ml,
        }
    }
}

/// Inbound request fields before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDraft {
    pub patient_name: String,
    pub hospital: String,
    pub blood_type: BloodType,
    pub component: ComponentKind,
    pub volume_ml: u32,
    pub urgency: Urgency,
    #[serde(default)]
    pub reason: String,
}

impl RequestDraft {
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.patient_name.trim().is_empty() {
            return Err(RequestValidationError::BlankField("patient_name"));
        }
        if self.hospital.trim().is_empty() {
            return Err(RequestValidationError::BlankField("hospital"));
        }
        if self.volume_ml == 0 {
            return Err(RequestValidationError::NonPositiveVolume);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestValidationError {
    #[error("required field {0} is blank")]
    BlankField(&'static str),
    #[error("requested volume must be positive")]
    NonPositiveVolume,
}

/// Sanitized request snapshot for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct RequestStatusView {
    pub request_id: RequestId,
    pub hospital: String,
    pub status: &'static str,
    pub requested_ml: u32,
    pub reserved_ml: u32,
}
