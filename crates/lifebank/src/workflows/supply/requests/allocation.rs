use crate::workflows::supply::inventory::domain::SeparatedComponent;

use super::domain::BloodRequest;

/// Allocation failures; `Mismatch` and `ShortVolume` are both
/// insufficient-inventory outcomes, kept distinct so messages stay precise.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("no components were named for allocation")]
    EmptyAllocation,
    #[error("component {component} is {found_type} {found_kind}, request {request} needs {expected_type} {expected_kind}")]
    Mismatch {
        component: String,
        request: String,
        expected_type: &'static str,
        expected_kind: &'static str,
        found_type: &'static str,
        found_kind: &'static str,
    },
    #[error("offered {offered_ml} mL does not cover the remaining {remaining_ml} mL and partial holds are disabled")]
    ShortVolume { remaining_ml: u32, offered_ml: u32 },
}

/// Validate a set of named components against the request before anything is
/// reserved: kinds and blood types must match, and the offer must cover the
/// remaining volume unless a partial waiting-payment hold is allowed.
/// Returns the offered volume.
pub(crate) fn check_allocation(
    request: &BloodRequest,
    components: &[SeparatedComponent],
    allow_partial_hold: bool,
) -> Result<u32, AllocationError> {
    if components.is_empty() {
        return Err(AllocationError::EmptyAllocation);
    }

    for component in components {
        if component.blood_type != request.blood_type || component.kind != request.component {
            return Err(AllocationError::Mismatch {
                component: component.component_id.0.clone(),
                request: request.request_id.0.clone(),
                expected_type: request.blood_type.label(),
                expected_kind: request.component.label(),
                found_type: component.blood_type.label(),
                found_kind: component.kind.label(),
            });
        }
    }

    let offered_ml = components
        .iter()
        .map(|component| component.volume_ml)
        .fold(0u32, u32::saturating_add);
    let remaining_ml = request.volume_ml.saturating_sub(request.reserved_ml);
    if offered_ml < remaining_ml && !allow_partial_hold {
        return Err(AllocationError::ShortVolume {
            remaining_ml,
            offered_ml,
        });
    }

    Ok(offered_ml)
}
