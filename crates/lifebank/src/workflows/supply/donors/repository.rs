use crate::workflows::supply::domain::DonorId;
use crate::workflows::supply::store::StoreError;

use super::domain::{MedicalProfile, ProfileId};

/// Storage seam for medical profiles. One profile per donor; `insert` rejects
/// a second profile for the same donor, `update` is a compare-and-swap on
/// `version`.
pub trait ProfileRepository: Send + Sync {
    fn insert(&self, profile: MedicalProfile) -> Result<MedicalProfile, StoreError>;
    fn update(&self, profile: MedicalProfile) -> Result<MedicalProfile, StoreError>;
    fn fetch(&self, id: &ProfileId) -> Result<Option<MedicalProfile>, StoreError>;
    fn fetch_by_donor(&self, donor_id: &DonorId) -> Result<Option<MedicalProfile>, StoreError>;
}
