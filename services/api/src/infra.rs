use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use lifebank::config::PolicyConfig;
use lifebank::workflows::supply::domain::StockThresholds;
use lifebank::workflows::supply::donors::EligibilityService;
use lifebank::workflows::supply::drives::{EventRegistry, RegistrationLedger};
use lifebank::workflows::supply::inventory::{SeparationEngine, UnitInventory};
use lifebank::workflows::supply::memory::{
    MemoryComponents, MemoryEvents, MemoryProfiles, MemoryPublisher, MemoryRegistrations,
    MemoryRequests, MemoryUnits,
};
use lifebank::workflows::supply::requests::FulfillmentService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// The fully wired supply-chain services over the in-memory backend.
pub(crate) struct Services {
    pub(crate) eligibility: Arc<EligibilityService<MemoryProfiles>>,
    pub(crate) registry: Arc<EventRegistry<MemoryEvents, MemoryRegistrations>>,
    pub(crate) ledger: Arc<
        RegistrationLedger<MemoryRegistrations, MemoryEvents, MemoryProfiles, MemoryPublisher>,
    >,
    pub(crate) inventory: Arc<UnitInventory<MemoryUnits>>,
    pub(crate) engine: Arc<SeparationEngine<MemoryUnits, MemoryComponents>>,
    pub(crate) fulfillment:
        Arc<FulfillmentService<MemoryRequests, MemoryComponents, MemoryPublisher>>,
    pub(crate) units: Arc<MemoryUnits>,
    pub(crate) components: Arc<MemoryComponents>,
    pub(crate) publisher: Arc<MemoryPublisher>,
    pub(crate) stock_thresholds: StockThresholds,
    pub(crate) expiry_horizon_days: i64,
}

pub(crate) fn build_services(policies: &PolicyConfig) -> Services {
    let profiles = Arc::new(MemoryProfiles::default());
    let events = Arc::new(MemoryEvents::default());
    let registrations = Arc::new(MemoryRegistrations::default());
    let units = Arc::new(MemoryUnits::default());
    let components = Arc::new(MemoryComponents::default());
    let requests = Arc::new(MemoryRequests::default());
    let publisher = Arc::new(MemoryPublisher::default());

    let eligibility = Arc::new(EligibilityService::new(profiles, policies.eligibility()));
    let registry = Arc::new(EventRegistry::new(events.clone(), registrations.clone()));
    let ledger = Arc::new(RegistrationLedger::new(
        registrations,
        events,
        eligibility.clone(),
        publisher.clone(),
    ));
    let inventory = Arc::new(UnitInventory::new(units.clone(), policies.inventory()));
    let engine = Arc::new(SeparationEngine::new(inventory.clone(), components.clone()));
    let fulfillment = Arc::new(FulfillmentService::new(
        requests,
        components.clone(),
        publisher.clone(),
        policies.fulfillment(),
    ));

    Services {
        eligibility,
        registry,
        ledger,
        inventory,
        engine,
        fulfillment,
        units,
        components,
        publisher,
        stock_thresholds: policies.stock_thresholds(),
        expiry_horizon_days: policies.expiry_horizon_days,
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
