use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::workflows::supply::domain::{ComponentKind, InvalidTransition};
use crate::workflows::supply::store::StoreError;

use super::domain::{ComponentId, ComponentSpec, SeparatedComponent, SeparationStatus, UnitId};
use super::repository::{ComponentRepository, UnitRepository};
use super::service::{InventoryError, UnitInventory};

static COMPONENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_component_id() -> ComponentId {
    let id = COMPONENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ComponentId(format!("comp-{id:06}"))
}

/// Splits a unit in `processing` into its typed components, exactly once.
///
/// The component set is written all-or-nothing; a failed write rolls the unit
/// to `error` with the reason, so a partial component set is never left
/// standing.
pub struct SeparationEngine<U, C> {
    inventory: Arc<UnitInventory<U>>,
    components: Arc<C>,
}

impl<U, C> SeparationEngine<U, C>
where
    U: UnitRepository + 'static,
    C: ComponentRepository + 'static,
{
    pub fn new(inventory: Arc<UnitInventory<U>>, components: Arc<C>) -> Self {
        Self {
            inventory,
            components,
        }
    }

    pub fn separate(
        &self,
        unit_id: &UnitId,
        specs: Vec<ComponentSpec>,
        now: NaiveDateTime,
    ) -> Result<Vec<SeparatedComponent>, SeparationError> {
        let unit = self.inventory.fetch_unit(unit_id)?;
        if unit.separation != SeparationStatus::Processing {
            return Err(SeparationError::Transition(InvalidTransition {
                entity: "blood unit",
                id: unit.unit_id.0.clone(),
                from: unit.separation.label(),
                to: SeparationStatus::Processed.label(),
            }));
        }

        if specs.is_empty() {
            return Err(SeparationError::EmptyPlan);
        }
        let mut planned_ml: u32 = 0;
        for spec in &specs {
            if spec.volume_ml == 0 {
                return Err(SeparationError::ZeroVolume { kind: spec.kind });
            }
            planned_ml = planned_ml.saturating_add(spec.volume_ml);
        }
        if planned_ml > unit.volume_ml {
            return Err(SeparationError::OverVolume {
                unit_ml: unit.volume_ml,
                planned_ml,
            });
        }

        let components: Vec<SeparatedComponent> = specs
            .into_iter()
            .map(|spec| SeparatedComponent {
                component_id: next_component_id(),
                unit_id: unit.unit_id.clone(),
                blood_type: unit.blood_type,
                kind: spec.kind,
                volume_ml: spec.volume_ml,
                separated_at: now,
                expires_on: spec.expires_on.or(Some(unit.expires_on)),
                available: true,
                reserved_for: None,
                version: 1,
            })
            .collect();

        match self.components.insert_all(components.clone()) {
            Ok(()) => {
                self.inventory.mark_separated(unit_id)?;
                tracing::info!(
                    unit = %unit_id.0,
                    components = components.len(),
                    planned_ml,
                    "unit separated"
                );
                Ok(components)
            }
            Err(err) => {
                let reason = format!("component persistence failed: {err}");
                if let Err(mark_err) = self.inventory.mark_error(unit_id, reason) {
                    tracing::error!(
                        unit = %unit_id.0,
                        error = %mark_err,
                        "could not record separation failure on unit"
                    );
                }
                Err(SeparationError::Store(err))
            }
        }
    }
}

/// Error raised by the separation engine.
#[derive(Debug, thiserror::Error)]
pub enum SeparationError {
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("a separation plan needs at least one component")]
    EmptyPlan,
    #[error("component {kind} has zero volume")]
    ZeroVolume { kind: ComponentKind },
    #[error("planned {planned_ml} mL exceeds the unit's {unit_ml} mL")]
    OverVolume { unit_ml: u32, planned_ml: u32 },
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
