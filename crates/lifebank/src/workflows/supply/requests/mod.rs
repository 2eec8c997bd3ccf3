//! Hospital blood requests and fulfillment.
//!
//! A request is decided (`approve`/`reject`) from `pending`, then covered by
//! reserving matching separated components. Full coverage fulfills it; a
//! partial hold is only taken under the waiting-payment policy and can be
//! confirmed or cancelled (which releases the components).

pub mod allocation;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use allocation::AllocationError;
pub use domain::{
    BloodRequest, Decision, RequestDraft, RequestId, RequestStatus, RequestStatusView,
    RequestValidationError,
};
pub use repository::RequestRepository;
pub use router::request_router;
pub use service::{FulfillmentError, FulfillmentPolicy, FulfillmentService};
