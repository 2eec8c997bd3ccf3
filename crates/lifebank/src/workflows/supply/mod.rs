//! Blood supply-chain workflows.
//!
//! The pipeline runs donor eligibility -> drive registration -> unit intake ->
//! component separation -> request fulfillment. Each stage owns a closed
//! status state machine; stages are linked by existence preconditions (a
//! registration needs a non-blocked profile, a separation needs a unit in
//! `processing`, an allocation needs available components). All mutation goes
//! through the stage services; callers never assign status fields directly.

pub mod domain;
pub mod donors;
pub mod drives;
pub mod events;
pub(crate) mod http;
pub mod inventory;
pub mod manifest;
pub mod memory;
pub mod report;
pub mod requests;
pub mod store;

pub use domain::{BloodType, ComponentKind, DonorId, StockLevel, StockThresholds, Urgency};
pub use events::{EventPublisher, PublishError, SupplyEvent};
pub use store::StoreError;
