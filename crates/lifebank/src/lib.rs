//! LifeBank blood-bank operations core.
//!
//! The supply-chain workflows (donor eligibility, donation drives, unit
//! inventory, component separation, request fulfillment) live under
//! [`workflows::supply`]. Embedding applications wire the repository and
//! publisher seams and mount the per-workflow routers.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
