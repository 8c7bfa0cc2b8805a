use medrush_core::{CoreError, PharmacyId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("pharmacy not found: {pharmacy_id}")]
    NotFound { pharmacy_id: PharmacyId },
}

impl From<CoreError> for LocatorError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(reason) => LocatorError::Validation(reason),
            other @ CoreError::InvalidItemId(_) => LocatorError::Validation(other.to_string()),
        }
    }
}
