//! Blood-unit inventory and the separation engine.
//!
//! A collected unit moves `unprocessed -> processing -> {processed, error}`;
//! entering `processing` happens at most once, which is what makes a second
//! separation of the same unit impossible. The engine writes the component
//! set all-or-nothing and rolls the unit to `error` when the write fails.

pub mod domain;
pub mod repository;
pub mod router;
pub mod separation;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    BloodUnit, ComponentId, ComponentSpec, SeparatedComponent, SeparationStatus, UnitDraft,
    UnitId,
};
pub use repository::{ComponentRepository, UnitRepository};
pub use router::inventory_router;
pub use separation::{SeparationEngine, SeparationError};
pub use service::{InventoryError, InventoryPolicy, UnitInventory, UnitIntakeError};
