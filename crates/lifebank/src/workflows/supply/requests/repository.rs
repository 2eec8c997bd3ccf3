use crate::workflows::supply::store::StoreError;

use super::domain::{BloodRequest, RequestId};

/// Storage seam for blood requests. `update` is a compare-and-swap on
/// `version`.
pub trait RequestRepository: Send + Sync {
    fn insert(&self, request: BloodRequest) -> Result<BloodRequest, StoreError>;
    fn update(&self, request: BloodRequest) -> Result<BloodRequest, StoreError>;
    fn fetch(&self, id: &RequestId) -> Result<Option<BloodRequest>, StoreError>;
    fn list(&self) -> Result<Vec<BloodRequest>, StoreError>;
}
