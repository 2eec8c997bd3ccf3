use std::sync::Arc;

use super::common::*;
use crate::workflows::supply::domain::ComponentKind;
use crate::workflows::supply::inventory::domain::{ComponentSpec, SeparationStatus};
use crate::workflows::supply::inventory::repository::ComponentRepository;
use crate::workflows::supply::inventory::separation::{SeparationEngine, SeparationError};
use crate::workflows::supply::store::StoreError;

#[test]
fn separation_creates_components_and_marks_the_unit_processed() {
    let inventory = inventory();
    let (engine, components) = engine(inventory.clone());
    let unit = inventory.intake_unit(draft()).expect("intake succeeds");
    inventory
        .mark_separating(&unit.unit_id)
        .expect("claim succeeds");

    let created = engine
        .separate(&unit.unit_id, standard_plan(), now())
        .expect("separation succeeds");

    assert_eq!(created.len(), 3);
    assert!(created.iter().all(|component| component.available));
    assert!(created
        .iter()
        .all(|component| component.blood_type == unit.blood_type));
    assert!(created
        .iter()
        .all(|component| component.expires_on == Some(unit.expires_on)));

    let processed = inventory.fetch_unit(&unit.unit_id).expect("unit readable");
    assert_eq!(processed.separation, SeparationStatus::Processed);

    let stored = components
        .list_by_unit(&unit.unit_id)
        .expect("components readable");
    assert_eq!(stored.len(), 3);
    let total: u32 = stored.iter().map(|component| component.volume_ml).sum();
    assert!(total <= unit.volume_ml);
}

#[test]
fn a_second_separation_of_the_same_unit_always_fails() {
    let inventory = inventory();
    let (engine, _) = engine(inventory.clone());
    let unit = inventory.intake_unit(draft()).expect("intake succeeds");
    inventory
        .mark_separating(&unit.unit_id)
        .expect("claim succeeds");
    engine
        .separate(&unit.unit_id, standard_plan(), now())
        .expect("first separation succeeds");

    match engine.separate(&unit.unit_id, standard_plan(), now()) {
        Err(SeparationError::Transition(err)) => {
            assert_eq!(err.from, "processed");
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn separation_requires_the_unit_to_be_claimed_first() {
    let inventory = inventory();
    let (engine, _) = engine(inventory.clone());
    let unit = inventory.intake_unit(draft()).expect("intake succeeds");

    match engine.separate(&unit.unit_id, standard_plan(), now()) {
        Err(SeparationError::Transition(err)) => assert_eq!(err.from, "unprocessed"),
        other => panic!("expected transition error, got {other:?}"),
    }
}

#[test]
fn plan_volume_cannot_exceed_the_unit() {
    let inventory = inventory();
    let (engine, _) = engine(inventory.clone());
    let unit = inventory.intake_unit(draft()).expect("intake succeeds");
    inventory
        .mark_separating(&unit.unit_id)
        .expect("claim succeeds");

    let oversized = vec![ComponentSpec {
        kind: ComponentKind::RedCell,
        volume_ml: 500,
        expires_on: None,
    }];
    match engine.separate(&unit.unit_id, oversized, now()) {
        Err(SeparationError::OverVolume { unit_ml, planned_ml }) => {
            assert_eq!((unit_ml, planned_ml), (450, 500));
        }
        other => panic!("expected over-volume rejection, got {other:?}"),
    }

    // Rejected plans must not consume the claim.
    let unit = inventory.fetch_unit(&unit.unit_id).expect("unit readable");
    assert_eq!(unit.separation, SeparationStatus::Processing);
}

#[test]
fn empty_and_zero_volume_plans_are_rejected() {
    let inventory = inventory();
    let (engine, _) = engine(inventory.clone());
    let unit = inventory.intake_unit(draft()).expect("intake succeeds");
    inventory
        .mark_separating(&unit.unit_id)
        .expect("claim succeeds");

    assert!(matches!(
        engine.separate(&unit.unit_id, Vec::new(), now()),
        Err(SeparationError::EmptyPlan)
    ));

    let zero = vec![ComponentSpec {
        kind: ComponentKind::Plasma,
        volume_ml: 0,
        expires_on: None,
    }];
    assert!(matches!(
        engine.separate(&unit.unit_id, zero, now()),
        Err(SeparationError::ZeroVolume {
            kind: ComponentKind::Plasma
        })
    ));
}

#[test]
fn failed_component_write_rolls_the_unit_to_error() {
    let inventory = inventory();
    let engine = SeparationEngine::new(inventory.clone(), Arc::new(FailingComponents));
    let unit = inventory.intake_unit(draft()).expect("intake succeeds");
    inventory
        .mark_separating(&unit.unit_id)
        .expect("claim succeeds");

    match engine.separate(&unit.unit_id, standard_plan(), now()) {
        Err(SeparationError::Store(StoreError::Unavailable(_))) => {}
        other => panic!("expected store failure, got {other:?}"),
    }

    let failed = inventory.fetch_unit(&unit.unit_id).expect("unit readable");
    assert_eq!(failed.separation, SeparationStatus::Error);
    assert!(failed
        .failure_reason
        .as_deref()
        .is_some_and(|reason| reason.contains("component persistence failed")));
}
