use serde::{Deserialize, Serialize};

use super::domain::{BloodType, ComponentKind, DonorId};
use super::drives::domain::{EventId, RegistrationId};
use super::requests::domain::RequestId;

/// Notifications the core emits for the external messaging dispatcher.
/// Delivery (email/SMS/push) and its retries belong to the dispatcher, not to
/// the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SupplyEvent {
    RegistrationCompleted {
        registration_id: RegistrationId,
        donor_id: DonorId,
        event_id: EventId,
    },
    RequestFulfilled {
        request_id: RequestId,
        hospital: String,
        blood_type: BloodType,
    },
    LowStock {
        blood_type: BloodType,
        component: ComponentKind,
        available_ml: u32,
    },
}

/// Outbound notification seam.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: SupplyEvent) -> Result<(), PublishError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("event transport unavailable: {0}")]
    Transport(String),
}
