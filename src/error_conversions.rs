//! Error conversion glue between layers.
//!
//! The domain layer must not depend on service error types, so the
//! conversions live here instead of next to the types they connect.

use crate::domain::types::TypeConstraintError;
use crate::forms::attributes::AttributeFormError;
use crate::forms::categories::CategoryFormError;
use crate::forms::crops::CropFormError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<AttributeFormError> for ServiceError {
    fn from(val: AttributeFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<CategoryFormError> for ServiceError {
    fn from(val: CategoryFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<CropFormError> for ServiceError {
    fn from(val: CropFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}
