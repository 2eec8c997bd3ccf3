//! Collection-manifest import.
//!
//! Drive staff export a spreadsheet of collected units; the importer parses
//! and validates every row before a single unit is taken in, so a malformed
//! manifest is rejected whole with a row-numbered error.

mod parser;

use std::io::Read;
use std::path::Path;

use crate::workflows::supply::inventory::domain::{BloodUnit, UnitDraft};
use crate::workflows::supply::inventory::repository::UnitRepository;
use crate::workflows::supply::inventory::service::{InventoryError, UnitInventory};

/// Error raised while importing a collection manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestImportError {
    #[error("failed to read collection manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid manifest CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown blood type '{value}'")]
    UnknownBloodType { row: usize, value: String },
    #[error("row {row}: invalid volume '{value}'")]
    InvalidVolume { row: usize, value: String },
    #[error("row {row}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: {source}")]
    Rejected {
        row: usize,
        source: InventoryError,
    },
}

pub struct CollectionManifestImporter;

impl CollectionManifestImporter {
    pub fn from_path<P, U>(
        path: P,
        inventory: &UnitInventory<U>,
    ) -> Result<Vec<BloodUnit>, ManifestImportError>
    where
        P: AsRef<Path>,
        U: UnitRepository + 'static,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, inventory)
    }

    pub fn from_reader<R, U>(
        reader: R,
        inventory: &UnitInventory<U>,
    ) -> Result<Vec<BloodUnit>, ManifestImportError>
    where
        R: Read,
        U: UnitRepository + 'static,
    {
        let records = parser::parse_records(reader)?;

        let mut drafts: Vec<(usize, UnitDraft)> = Vec::with_capacity(records.len());
        for record in records {
            let row = record.row;
            let draft = UnitDraft {
                donor_id: record.donor_id,
                registration_id: None,
                blood_type: record.blood_type,
                volume_ml: record.volume_ml,
                collected_on: record.collected_on,
                expires_on: record.expires_on,
            };
            inventory
                .policy()
                .validate(&draft)
                .map_err(|err| ManifestImportError::Rejected {
                    row,
                    source: InventoryError::Intake(err),
                })?;
            drafts.push((row, draft));
        }

        let mut units = Vec::with_capacity(drafts.len());
        for (row, draft) in drafts {
            let unit = inventory
                .intake_unit(draft)
                .map_err(|source| ManifestImportError::Rejected { row, source })?;
            units.push(unit);
        }

        tracing::info!(units = units.len(), "collection manifest imported");
        Ok(units)
    }
}
