use chrono::NaiveDate;
use serde::Serialize;

/// Snapshot handed to the reporting collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct StockReport {
    pub generated_on: NaiveDate,
    pub lines: Vec<StockLine>,
    pub expiring_units: Vec<ExpiringUnit>,
}

/// Available volume for one blood type / component kind pair.
#[derive(Debug, Clone, Serialize)]
pub struct StockLine {
    pub blood_type: &'static str,
    pub component: &'static str,
    pub available_ml: u32,
    pub level: &'static str,
}

/// An unprocessed unit whose expiry falls inside the report horizon.
#[derive(Debug, Clone, Serialize)]
pub struct ExpiringUnit {
    pub unit_id: String,
    pub blood_type: &'static str,
    pub volume_ml: u32,
    pub expires_on: NaiveDate,
}
