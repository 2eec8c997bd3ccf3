//! Read-only stock snapshots for the reporting collaborator.
//!
//! Everything here is derived on demand; formatting (CSV/PDF) belongs to the
//! external export collaborator.

mod views;

pub use views::{ExpiringUnit, StockLine, StockReport};

use chrono::{Duration, NaiveDate};

use super::domain::{StockLevel, StockThresholds};
use super::inventory::repository::{ComponentRepository, UnitRepository};
use super::inventory::SeparationStatus;
use super::store::StoreError;

use std::collections::BTreeMap;

/// Build the current stock snapshot: available volume per blood type and
/// component kind with the derived stock level, plus units expiring within
/// `horizon_days`.
pub fn stock_report<C, U>(
    components: &C,
    units: &U,
    thresholds: &StockThresholds,
    today: NaiveDate,
    horizon_days: i64,
) -> Result<StockReport, StoreError>
where
    C: ComponentRepository,
    U: UnitRepository,
{
    let mut totals: BTreeMap<_, u32> = BTreeMap::new();
    for component in components.list()? {
        if !component.available || component.is_expired(today) {
            continue;
        }
        let entry = totals
            .entry((component.blood_type, component.kind))
            .or_default();
        *entry = entry.saturating_add(component.volume_ml);
    }

    let lines = totals
        .into_iter()
        .map(|((blood_type, kind), available_ml)| StockLine {
            blood_type: blood_type.label(),
            component: kind.label(),
            available_ml,
            level: StockLevel::classify(available_ml, thresholds).label(),
        })
        .collect();

    let horizon = today + Duration::days(horizon_days.max(1));
    let mut expiring_units: Vec<ExpiringUnit> = units
        .list()?
        .into_iter()
        .filter(|unit| {
            unit.separation == SeparationStatus::Unprocessed
                && !unit.is_expired(today)
                && unit.expires_on <= horizon
        })
        .map(|unit| ExpiringUnit {
            unit_id: unit.unit_id.0,
            blood_type: unit.blood_type.label(),
            volume_ml: unit.volume_ml,
            expires_on: unit.expires_on,
        })
        .collect();
    expiring_units.sort_by(|a, b| a.expires_on.cmp(&b.expires_on));

    Ok(StockReport {
        generated_on: today,
        lines,
        expiring_units,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::supply::domain::{BloodType, ComponentKind};
    use crate::workflows::supply::inventory::domain::{
        BloodUnit, ComponentId, SeparatedComponent, UnitId,
    };
    use crate::workflows::supply::memory::{MemoryComponents, MemoryUnits};

    fn component(
        id: &str,
        blood_type: BloodType,
        volume_ml: u32,
        available: bool,
    ) -> SeparatedComponent {
        SeparatedComponent {
            component_id: ComponentId(id.to_string()),
            unit_id: UnitId("unit-000001".to_string()),
            blood_type,
            kind: ComponentKind::RedCell,
            volume_ml,
            separated_at: NaiveDate::from_ymd_opt(2025, 1, 2)
                .expect("valid date")
                .and_hms_opt(9, 0, 0)
                .expect("valid time"),
            expires_on: Some(NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")),
            available,
            reserved_for: None,
            version: 1,
        }
    }

    fn unit(id: &str, expires_on: NaiveDate) -> BloodUnit {
        BloodUnit {
            unit_id: UnitId(id.to_string()),
            donor_id: None,
            registration_id: None,
            blood_type: BloodType::APositive,
            volume_ml: 450,
            collected_on: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
            expires_on,
            separation: SeparationStatus::Unprocessed,
            failure_reason: None,
            audit: Vec::new(),
            version: 1,
        }
    }

    #[test]
    fn report_sums_available_volume_and_classifies_levels() {
        let components = MemoryComponents::default();
        components
            .insert_all(vec![
                component("comp-1", BloodType::ONegative, 600, true),
                component("comp-2", BloodType::ONegative, 500, true),
                component("comp-3", BloodType::ONegative, 400, false),
                component("comp-4", BloodType::APositive, 2_500, true),
            ])
            .expect("seed components");
        let units = MemoryUnits::default();

        let today = NaiveDate::from_ymd_opt(2025, 1, 10).expect("valid date");
        let report = stock_report(
            &components,
            &units,
            &StockThresholds::new(2_000, 800),
            today,
            7,
        )
        .expect("report builds");

        let o_neg = report
            .lines
            .iter()
            .find(|line| line.blood_type == "O-")
            .expect("O- line present");
        assert_eq!(o_neg.available_ml, 1_100, "reserved volume is excluded");
        assert_eq!(o_neg.level, "low");

        let a_pos = report
            .lines
            .iter()
            .find(|line| line.blood_type == "A+")
            .expect("A+ line present");
        assert_eq!(a_pos.level, "good");
    }

    #[test]
    fn report_lists_units_expiring_within_the_horizon() {
        let components = MemoryComponents::default();
        let units = MemoryUnits::default();
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).expect("valid date");

        units
            .insert(unit(
                "unit-soon",
                NaiveDate::from_ymd_opt(2025, 1, 14).expect("valid date"),
            ))
            .expect("insert");
        units
            .insert(unit(
                "unit-later",
                NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"),
            ))
            .expect("insert");

        let report = stock_report(
            &components,
            &units,
            &StockThresholds::default(),
            today,
            7,
        )
        .expect("report builds");

        assert_eq!(report.expiring_units.len(), 1);
        assert_eq!(report.expiring_units[0].unit_id, "unit-soon");
    }
}
