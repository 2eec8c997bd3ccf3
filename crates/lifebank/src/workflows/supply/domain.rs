use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the donor a profile, registration, or unit belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DonorId(pub String);

/// ABO/Rh blood groups handled by the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::APositive,
            Self::ANegative,
            Self::BPositive,
            Self::BNegative,
            Self::AbPositive,
            Self::AbNegative,
            Self::OPositive,
            Self::ONegative,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::ordered()
            .into_iter()
            .find(|blood_type| blood_type.label() == normalized)
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed fractions a raw unit can be separated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    WholeBlood,
    RedCell,
    Plasma,
    Platelet,
}

impl ComponentKind {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::WholeBlood,
            Self::RedCell,
            Self::Plasma,
            Self::Platelet,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::WholeBlood => "whole_blood",
            Self::RedCell => "red_cell",
            Self::Plasma => "plasma",
            Self::Platelet => "platelet",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Urgency tiers a hospital can attach to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Routine,
    Urgent,
    Critical,
}

impl Urgency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Urgent => "urgent",
            Self::Critical => "critical",
        }
    }
}

/// Stock-level axis derived from available component volume. Independent of a
/// unit's separation status; computed for reports, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    Good,
    Low,
    Critical,
}

impl StockLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Low => "low",
            Self::Critical => "critical",
        }
    }

    pub fn classify(available_ml: u32, thresholds: &StockThresholds) -> Self {
        if available_ml < thresholds.critical_ml {
            Self::Critical
        } else if available_ml < thresholds.low_ml {
            Self::Low
        } else {
            Self::Good
        }
    }
}

const DEFAULT_LOW_STOCK_ML: u32 = 2_000;
const DEFAULT_CRITICAL_STOCK_ML: u32 = 800;

/// Volume thresholds backing the stock-level classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockThresholds {
    pub low_ml: u32,
    pub critical_ml: u32,
}

impl StockThresholds {
    pub fn new(low_ml: u32, critical_ml: u32) -> Self {
        let critical_ml = critical_ml.min(low_ml);
        Self {
            low_ml,
            critical_ml,
        }
    }
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_STOCK_ML, DEFAULT_CRITICAL_STOCK_ML)
    }
}

/// Staff-entered trail entry kept on entities that allow manual overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditNote {
    pub at: NaiveDateTime,
    pub note: String,
}

/// State-machine violation: the requested transition is not reachable from the
/// entity's current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub entity: &'static str,
    pub id: String,
    pub from: &'static str,
    pub to: &'static str,
}
