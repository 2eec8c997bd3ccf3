use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;

use lifebank::config::AppConfig;
use lifebank::error::AppError;
use lifebank::workflows::supply::domain::{BloodType, ComponentKind, DonorId, Urgency};
use lifebank::workflows::supply::donors::{
    ContactDetails, Gender, ProfileSubmission, ReviewDecision,
};
use lifebank::workflows::supply::drives::{EventDraft, RegistrationStatus};
use lifebank::workflows::supply::inventory::{ComponentSpec, UnitDraft};
use lifebank::workflows::supply::manifest::CollectionManifestImporter;
use lifebank::workflows::supply::report::{stock_report, StockReport};
use lifebank::workflows::supply::requests::{Decision, RequestDraft};

use crate::infra::{build_services, Services};

#[derive(Args, Debug, Default)]
pub(crate) struct StockReportArgs {
    /// Report date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Optional collection manifest CSV to seed the inventory first
    #[arg(long)]
    pub(crate) manifest: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Anchor date for the demo timeline (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_stock_report(args: StockReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let services = build_services(&config.policies);
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    if let Some(path) = args.manifest {
        let units = CollectionManifestImporter::from_path(path, &services.inventory)?;
        println!("Imported {} unit(s) from collection manifest", units.len());
    }

    let report = build_report(&services, today)?;
    render_stock_report(&report);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let services = build_services(&config.policies);
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let morning = today.and_hms_opt(10, 0, 0).unwrap_or_default();

    println!("LifeBank supply-chain demo ({today})");

    // Donor intake and medical review.
    let profile = services
        .eligibility
        .submit_profile(demo_submission(), today)
        .map_err(demo_error)?;
    println!("\nDonor intake");
    println!(
        "- profile {} for donor {} submitted ({})",
        profile.profile_id.0,
        profile.donor_id.0,
        profile.state.label()
    );
    let profile = services
        .eligibility
        .review_profile(&profile.profile_id, ReviewDecision::Approve)
        .map_err(demo_error)?;
    println!("- medical review approved -> {}", profile.state.label());

    // Drive registration.
    let event = services
        .registry
        .create_event(demo_event(today))
        .map_err(demo_error)?;
    let registration = services
        .ledger
        .register(profile.donor_id.clone(), event.event_id.clone(), morning)
        .map_err(demo_error)?;
    println!("\nDrive registration");
    println!(
        "- {} registered for '{}' ({})",
        registration.donor_id.0,
        event.title,
        registration.status.label()
    );
    let registration = services
        .ledger
        .change_status(&registration.registration_id, RegistrationStatus::Completed)
        .map_err(demo_error)?;
    println!("- registration completed -> {}", registration.status.label());

    // Collection and separation.
    let unit = services
        .inventory
        .intake_unit(demo_unit(&profile.donor_id, today))
        .map_err(demo_error)?;
    println!("\nCollection and separation");
    println!(
        "- unit {} collected ({} mL {})",
        unit.unit_id.0, unit.volume_ml, unit.blood_type
    );
    services
        .inventory
        .mark_separating(&unit.unit_id)
        .map_err(demo_error)?;
    let components = services
        .engine
        .separate(&unit.unit_id, demo_plan(), morning)
        .map_err(demo_error)?;
    for component in &components {
        println!(
            "- component {} ({} mL {})",
            component.component_id.0, component.volume_ml, component.kind
        );
    }

    // Hospital request fulfillment.
    let request = services
        .fulfillment
        .create_request(demo_request(), morning)
        .map_err(demo_error)?;
    services
        .fulfillment
        .decide(&request.request_id, Decision::Approve)
        .map_err(demo_error)?;
    let red_cells: Vec<_> = components
        .iter()
        .filter(|component| component.kind == ComponentKind::RedCell)
        .map(|component| component.component_id.clone())
        .collect();
    let request = services
        .fulfillment
        .allocate(&request.request_id, red_cells)
        .map_err(demo_error)?;
    println!("\nRequest fulfillment");
    println!(
        "- request {} for {}: {} ({}/{} mL reserved)",
        request.request_id.0,
        request.hospital,
        request.status.label(),
        request.reserved_ml,
        request.volume_ml
    );

    let report = build_report(&services, today)?;
    render_stock_report(&report);

    let notifications = services.publisher.events();
    if notifications.is_empty() {
        println!("\nNotifications: none");
    } else {
        println!("\nNotifications");
        for event in notifications {
            println!(
                "- {}",
                serde_json::to_string(&event).unwrap_or_else(|_| format!("{event:?}"))
            );
        }
    }

    Ok(())
}

fn build_report(services: &Services, today: NaiveDate) -> Result<StockReport, AppError> {
    stock_report(
        &*services.components,
        &*services.units,
        &services.stock_thresholds,
        today,
        services.expiry_horizon_days,
    )
    .map_err(|err| AppError::Io(std::io::Error::other(err.to_string())))
}

fn render_stock_report(report: &StockReport) {
    println!("\nStock snapshot ({})", report.generated_on);
    if report.lines.is_empty() {
        println!("- no available components");
    }
    for line in &report.lines {
        println!(
            "- {} {}: {} mL ({})",
            line.blood_type, line.component, line.available_ml, line.level
        );
    }

    if report.expiring_units.is_empty() {
        println!("Expiring units: none");
    } else {
        println!("Expiring units");
        for unit in &report.expiring_units {
            println!(
                "- {} ({} mL {}), expires {}",
                unit.unit_id, unit.volume_ml, unit.blood_type, unit.expires_on
            );
        }
    }
}

fn demo_error(err: impl std::error::Error) -> AppError {
    AppError::Io(std::io::Error::other(err.to_string()))
}

fn demo_submission() -> ProfileSubmission {
    ProfileSubmission {
        donor_id: DonorId("donor-demo".to_string()),
        full_name: "Amara Osei".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 3, 14).unwrap_or_default(),
        gender: Gender::Female,
        national_id: "NID-5521".to_string(),
        contact: ContactDetails {
            email: "amara@example.org".to_string(),
            phone: "+233201234567".to_string(),
            address: "12 Ridge Rd".to_string(),
        },
        blood_type: BloodType::ONegative,
        disease_notes: Vec::new(),
    }
}

fn demo_event(today: NaiveDate) -> EventDraft {
    EventDraft {
        title: "City Hall Drive".to_string(),
        location: "City Hall Atrium".to_string(),
        starts_at: today.and_hms_opt(8, 0, 0).unwrap_or_default(),
        ends_at: today.and_hms_opt(16, 0, 0).unwrap_or_default(),
        description: "Quarterly community drive".to_string(),
    }
}

fn demo_unit(donor: &DonorId, today: NaiveDate) -> UnitDraft {
    UnitDraft {
        donor_id: Some(donor.clone()),
        registration_id: None,
        blood_type: BloodType::ONegative,
        volume_ml: 450,
        collected_on: today,
        expires_on: today + Duration::days(42),
    }
}

fn demo_plan() -> Vec<ComponentSpec> {
    vec![
        ComponentSpec {
            kind: ComponentKind::RedCell,
            volume_ml: 200,
            expires_on: None,
        },
        ComponentSpec {
            kind: ComponentKind::Plasma,
            volume_ml: 150,
            expires_on: None,
        },
        ComponentSpec {
            kind: ComponentKind::Platelet,
            volume_ml: 80,
            expires_on: None,
        },
    ]
}

fn demo_request() -> RequestDraft {
    RequestDraft {
        patient_name: "J. Ansah".to_string(),
        hospital: "Ridge Hospital".to_string(),
        blood_type: BloodType::ONegative,
        component: ComponentKind::RedCell,
        volume_ml: 200,
        urgency: Urgency::Urgent,
        reason: "scheduled surgery".to_string(),
    }
}
