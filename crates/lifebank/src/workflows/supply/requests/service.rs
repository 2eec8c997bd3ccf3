use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::workflows::supply::domain::{InvalidTransition, StockLevel, StockThresholds};
use crate::workflows::supply::events::{EventPublisher, SupplyEvent};
use crate::workflows::supply::inventory::domain::ComponentId;
use crate::workflows::supply::inventory::repository::ComponentRepository;
use crate::workflows::supply::store::{with_retry, StoreError};

use super::allocation::{check_allocation, AllocationError};
use super::domain::{
    BloodRequest, Decision, RequestDraft, RequestId, RequestStatus, RequestValidationError,
};
use super::repository::RequestRepository;

/// Fulfillment dials: whether partial coverage may be held as
/// `waiting_payment`, and the thresholds behind low-stock notifications.
#[derive(Debug, Clone)]
pub struct FulfillmentPolicy {
    pub allow_payment_hold: bool,
    pub stock: StockThresholds,
}

impl Default for FulfillmentPolicy {
    fn default() -> Self {
        Self {
            allow_payment_hold: true,
            stock: StockThresholds::default(),
        }
    }
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("req-{id:06}"))
}

/// Service owning the request lifecycle and component reservation.
pub struct FulfillmentService<R, C, N> {
    requests: Arc<R>,
    components: Arc<C>,
    publisher: Arc<N>,
    policy: FulfillmentPolicy,
}

impl<R, C, N> FulfillmentService<R, C, N>
where
    R: RequestRepository + 'static,
    C: ComponentRepository + 'static,
    N: EventPublisher + 'static,
{
    pub fn new(
        requests: Arc<R>,
        components: Arc<C>,
        publisher: Arc<N>,
        policy: FulfillmentPolicy,
    ) -> Self {
        Self {
            requests,
            components,
            publisher,
            policy,
        }
    }

    /// Validate and persist a new hospital request in state `pending`.
    pub fn create_request(
        &self,
        draft: RequestDraft,
        now: NaiveDateTime,
    ) -> Result<BloodRequest, FulfillmentError> {
        draft.validate()?;
        let request = BloodRequest {
            request_id: next_request_id(),
            patient_name: draft.patient_name,
            hospital: draft.hospital,
            blood_type: draft.blood_type,
            component: draft.component,
            volume_ml: draft.volume_ml,
            urgency: draft.urgency,
            reason: draft.reason,
            status: RequestStatus::Pending,
            requested_at: now,
            reserved: Vec::new(),
            reserved_ml: 0,
            version: 1,
        };
        let stored = with_retry(|| self.requests.insert(request.clone()))?;
        tracing::info!(
            request = %stored.request_id.0,
            hospital = %stored.hospital,
            blood_type = %stored.blood_type,
            "blood request created"
        );
        Ok(stored)
    }

    /// Approve or reject a pending request. Repeating the same decision is a
    /// no-op.
    pub fn decide(
        &self,
        id: &RequestId,
        decision: Decision,
    ) -> Result<BloodRequest, FulfillmentError> {
        let mut request = self.fetch_required(id)?;
        if !request.apply_decision(decision)? {
            return Ok(request);
        }
        let updated = with_retry(|| self.requests.update(request.clone()))?;
        tracing::info!(request = %updated.request_id.0, status = updated.status.label(), "request decided");
        Ok(updated)
    }

    /// Reserve the named components for an approved request. Matching and
    /// coverage are checked before anything flips; the reservation itself is
    /// the repository's atomic first-reserver-wins call, so a competing
    /// request loses with a conflict and nothing is double-reserved.
    pub fn allocate(
        &self,
        id: &RequestId,
        component_ids: Vec<ComponentId>,
    ) -> Result<BloodRequest, FulfillmentError> {
        let mut request = self.fetch_required(id)?;
        if !matches!(
            request.status,
            RequestStatus::Approved | RequestStatus::WaitingPayment
        ) {
            return Err(FulfillmentError::Transition(InvalidTransition {
                entity: "blood request",
                id: request.request_id.0.clone(),
                from: request.status.label(),
                to: RequestStatus::Fulfilled.label(),
            }));
        }

        let named = with_retry(|| self.components.fetch_many(&component_ids))?;
        let offered_ml = check_allocation(&request, &named, self.policy.allow_payment_hold)?;

        let reserved = self
            .components
            .reserve(&component_ids, &request.request_id)?;

        request.reserved.extend(component_ids);
        request.reserved_ml = request.reserved_ml.saturating_add(offered_ml);
        request.status = if request.reserved_ml >= request.volume_ml {
            RequestStatus::Fulfilled
        } else {
            RequestStatus::WaitingPayment
        };

        let updated = match with_retry(|| self.requests.update(request.clone())) {
            Ok(updated) => updated,
            Err(err) => {
                // The reservation already happened; hand the components back
                // before surfacing the lost write.
                if let Err(release_err) = self.components.release(&request.request_id) {
                    tracing::error!(
                        request = %request.request_id.0,
                        error = %release_err,
                        "failed to release reservation after lost update"
                    );
                }
                return Err(err.into());
            }
        };

        tracing::info!(
            request = %updated.request_id.0,
            reserved = reserved.len(),
            reserved_ml = updated.reserved_ml,
            status = updated.status.label(),
            "components reserved"
        );

        if updated.status == RequestStatus::Fulfilled {
            self.notify(SupplyEvent::RequestFulfilled {
                request_id: updated.request_id.clone(),
                hospital: updated.hospital.clone(),
                blood_type: updated.blood_type,
            });
        }
        self.check_stock(&updated);

        Ok(updated)
    }

    /// Confirm a waiting-payment hold. Requires full coverage; top up with
    /// further `allocate` calls first if the hold is still short.
    pub fn confirm_payment(&self, id: &RequestId) -> Result<BloodRequest, FulfillmentError> {
        let mut request = self.fetch_required(id)?;
        if request.status != RequestStatus::WaitingPayment {
            return Err(FulfillmentError::Transition(InvalidTransition {
                entity: "blood request",
                id: request.request_id.0.clone(),
                from: request.status.label(),
                to: RequestStatus::Fulfilled.label(),
            }));
        }
        if request.reserved_ml < request.volume_ml {
            return Err(FulfillmentError::Allocation(AllocationError::ShortVolume {
                remaining_ml: request.volume_ml - request.reserved_ml,
                offered_ml: 0,
            }));
        }
        request.status = RequestStatus::Fulfilled;
        let updated = with_retry(|| self.requests.update(request.clone()))?;
        self.notify(SupplyEvent::RequestFulfilled {
            request_id: updated.request_id.clone(),
            hospital: updated.hospital.clone(),
            blood_type: updated.blood_type,
        });
        Ok(updated)
    }

    /// Cancel a waiting-payment hold, releasing every reserved component back
    /// to available and returning the request to `approved`.
    pub fn cancel_hold(&self, id: &RequestId) -> Result<BloodRequest, FulfillmentError> {
        let mut request = self.fetch_required(id)?;
        if request.status != RequestStatus::WaitingPayment {
            return Err(FulfillmentError::Transition(InvalidTransition {
                entity: "blood request",
                id: request.request_id.0.clone(),
                from: request.status.label(),
                to: RequestStatus::Approved.label(),
            }));
        }
        let released = self.components.release(&request.request_id)?;
        request.reserved.clear();
        request.reserved_ml = 0;
        request.status = RequestStatus::Approved;
        let updated = with_retry(|| self.requests.update(request.clone()))?;
        tracing::info!(
            request = %updated.request_id.0,
            released = released.len(),
            "payment hold cancelled, components released"
        );
        Ok(updated)
    }

    pub fn get(&self, id: &RequestId) -> Result<BloodRequest, FulfillmentError> {
        self.fetch_required(id)
    }

    fn fetch_required(&self, id: &RequestId) -> Result<BloodRequest, FulfillmentError> {
        Ok(with_retry(|| self.requests.fetch(id))?
            .ok_or_else(|| StoreError::NotFound(id.0.clone()))?)
    }

    fn notify(&self, event: SupplyEvent) {
        if let Err(err) = self.publisher.publish(event) {
            tracing::warn!(error = %err, "fulfillment notification failed");
        }
    }

    fn check_stock(&self, request: &BloodRequest) {
        let available_ml = match self
            .components
            .available_volume(request.blood_type, request.component)
        {
            Ok(available_ml) => available_ml,
            Err(err) => {
                tracing::warn!(error = %err, "stock check skipped");
                return;
            }
        };
        if StockLevel::classify(available_ml, &self.policy.stock) != StockLevel::Good {
            self.notify(SupplyEvent::LowStock {
                blood_type: request.blood_type,
                component: request.component,
                available_ml,
            });
        }
    }
}

/// Error raised by the fulfillment service.
#[derive(Debug, thiserror::Error)]
pub enum FulfillmentError {
    #[error(transparent)]
    Validation(#[from] RequestValidationError),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Store(#[from] StoreError),
}
