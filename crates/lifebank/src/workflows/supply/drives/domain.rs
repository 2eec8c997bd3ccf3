use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::workflows::supply::domain::{DonorId, InvalidTransition};

/// Identifier wrapper for donation events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Identifier wrapper for registrations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub String);

/// Derived window position of an event relative to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Ended,
}

impl EventStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Ended => "ended",
        }
    }
}

/// A time-boxed donation drive at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationEvent {
    pub event_id: EventId,
    pub title: String,
    pub location: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub description: String,
    pub version: u64,
}

impl DonationEvent {
    /// Window position at `now`; recomputed on every read, never stored.
    pub fn status_at(&self, now: NaiveDateTime) -> EventStatus {
        if now < self.starts_at {
            EventStatus::Upcoming
        } else if now < self.ends_at {
            EventStatus::Ongoing
        } else {
            EventStatus::Ended
        }
    }

    pub fn view_at(&self, now: NaiveDateTime) -> EventView {
        EventView {
            event_id: self.event_id.clone(),
            title: self.title.clone(),
            location: self.location.clone(),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            status: self.status_at(now).label(),
        }
    }
}

/// Staff-entered event fields before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub location: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    #[serde(default)]
    pub description: String,
}

impl EventDraft {
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::BlankField("title"));
        }
        if self.location.trim().is_empty() {
            return Err(EventValidationError::BlankField("location"));
        }
        if self.starts_at >= self.ends_at {
            return Err(EventValidationError::WindowInverted {
                starts_at: self.starts_at,
                ends_at: self.ends_at,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventValidationError {
    #[error("required field {0} is blank")]
    BlankField(&'static str),
    #[error("event window is inverted ({starts_at} does not precede {ends_at})")]
    WindowInverted {
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
    },
}

/// Listing entry with the derived status attached.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    pub event_id: EventId,
    pub title: String,
    pub location: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub status: &'static str,
}

/// Registration approval states; `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    Completed,
    Cancelled,
}

impl RegistrationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// A donor's claim on an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub registration_id: RegistrationId,
    pub donor_id: DonorId,
    pub event_id: EventId,
    pub registered_at: NaiveDateTime,
    pub status: RegistrationStatus,
    pub version: u64,
}

impl Registration {
    /// Move to `target`, returning whether anything changed. Repeating the
    /// status the registration already holds is a no-op so staff retries stay
    /// safe; crossing between terminals is rejected.
    pub(crate) fn transition(
        &mut self,
        target: RegistrationStatus,
    ) -> Result<bool, InvalidTransition> {
        if self.status == target {
            return Ok(false);
        }
        match (self.status, target) {
            (RegistrationStatus::Pending, RegistrationStatus::Completed)
            | (RegistrationStatus::Pending, RegistrationStatus::Cancelled) => {
                self.status = target;
                Ok(true)
            }
            _ => Err(InvalidTransition {
                entity: "registration",
                id: self.registration_id.0.clone(),
                from: self.status.label(),
                to: target.label(),
            }),
        }
    }
}
