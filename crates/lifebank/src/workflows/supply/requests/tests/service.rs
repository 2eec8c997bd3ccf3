use super::common::*;
use crate::workflows::supply::requests::domain::{
    Decision, RequestId, RequestStatus, RequestValidationError,
};
use crate::workflows::supply::requests::service::FulfillmentError;
use crate::workflows::supply::store::StoreError;

#[test]
fn create_request_validates_and_starts_pending() {
    let harness = harness();
    let request = harness
        .service
        .create_request(draft(), now())
        .expect("request created");
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.reserved_ml, 0);

    let mut blank = draft();
    blank.patient_name = " ".to_string();
    match harness.service.create_request(blank, now()) {
        Err(FulfillmentError::Validation(RequestValidationError::BlankField(
            "patient_name",
        ))) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn decide_moves_pending_and_is_idempotent() {
    let harness = harness();
    let request = harness
        .service
        .create_request(draft(), now())
        .expect("request created");

    let approved = harness
        .service
        .decide(&request.request_id, Decision::Approve)
        .expect("approval succeeds");
    assert_eq!(approved.status, RequestStatus::Approved);

    let repeated = harness
        .service
        .decide(&request.request_id, Decision::Approve)
        .expect("repeat approve is a no-op");
    assert_eq!(repeated.status, RequestStatus::Approved);
    assert_eq!(repeated.version, approved.version);
}

#[test]
fn approve_and_reject_are_mutually_exclusive() {
    let harness = harness();
    let request = harness
        .service
        .create_request(draft(), now())
        .expect("request created");
    harness
        .service
        .decide(&request.request_id, Decision::Reject)
        .expect("rejection succeeds");

    match harness.service.decide(&request.request_id, Decision::Approve) {
        Err(FulfillmentError::Transition(err)) => {
            assert_eq!(err.from, "rejected");
            assert_eq!(err.to, "approved");
        }
        other => panic!("expected transition error, got {other:?}"),
    }
}

#[test]
fn unknown_request_surfaces_not_found() {
    let harness = harness();
    match harness.service.get(&RequestId("req-999999".to_string())) {
        Err(FulfillmentError::Store(StoreError::NotFound(_))) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn status_view_reports_reserved_volume() {
    let harness = harness();
    seed_red_cells(&harness, &[("comp-1", 200)]);
    let request = harness
        .service
        .create_request(draft(), now())
        .expect("request created");
    harness
        .service
        .decide(&request.request_id, Decision::Approve)
        .expect("approval succeeds");
    let fulfilled = harness
        .service
        .allocate(&request.request_id, component_ids(&["comp-1"]))
        .expect("allocation succeeds");

    let view = fulfilled.status_view();
    assert_eq!(view.status, "fulfilled");
    assert_eq!(view.requested_ml, 200);
    assert_eq!(view.reserved_ml, 200);
}
