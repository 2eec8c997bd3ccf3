use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::workflows::supply::domain::{BloodType, DonorId};

use super::ManifestImportError;

#[derive(Debug)]
pub(crate) struct ManifestRecord {
    pub(crate) row: usize,
    pub(crate) blood_type: BloodType,
    pub(crate) volume_ml: u32,
    pub(crate) collected_on: NaiveDate,
    pub(crate) expires_on: NaiveDate,
    pub(crate) donor_id: Option<DonorId>,
}

pub(crate) fn parse_records<R: Read>(
    reader: R,
) -> Result<Vec<ManifestRecord>, ManifestImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, record) in csv_reader.deserialize::<ManifestRow>().enumerate() {
        let row = index + 1;
        let raw = record?;

        let blood_type = BloodType::parse(&raw.blood_type).ok_or_else(|| {
            ManifestImportError::UnknownBloodType {
                row,
                value: raw.blood_type.clone(),
            }
        })?;
        let volume_ml = raw.volume_ml.trim().parse::<u32>().map_err(|_| {
            ManifestImportError::InvalidVolume {
                row,
                value: raw.volume_ml.clone(),
            }
        })?;
        let collected_on = parse_date(&raw.collected_on, row)?;
        let expires_on = parse_date(&raw.expires_on, row)?;

        records.push(ManifestRecord {
            row,
            blood_type,
            volume_ml,
            collected_on,
            expires_on,
            donor_id: raw.donor_id.map(DonorId),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ManifestRow {
    #[serde(rename = "Blood Type")]
    blood_type: String,
    #[serde(rename = "Volume (mL)")]
    volume_ml: String,
    #[serde(rename = "Collected On")]
    collected_on: String,
    #[serde(rename = "Expires On")]
    expires_on: String,
    #[serde(rename = "Donor ID", default, deserialize_with = "empty_string_as_none")]
    donor_id: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str, row: usize) -> Result<NaiveDate, ManifestImportError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ManifestImportError::InvalidDate {
            row,
            value: value.to_string(),
        }
    })
}
