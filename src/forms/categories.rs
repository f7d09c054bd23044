use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::attribute::AttributeDefinitionDraft;
use crate::domain::category::NewCategory;
use crate::domain::types::{CategoryId, CategoryName, CategoryStatus, TypeConstraintError};
use crate::forms::attributes::{AttributeDefinitionForm, AttributeFormError};

/// Errors produced when converting category forms into typed payloads.
#[derive(Debug, Error)]
pub enum CategoryFormError {
    #[error("category form validation failed: {0}")]
    Validation(String),
    #[error("category form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for CategoryFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for CategoryFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl From<AttributeFormError> for CategoryFormError {
    fn from(value: AttributeFormError) -> Self {
        Self::Validation(value.to_string())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddCategoryForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub parent_id: Option<i32>,
    /// Defaults to `pending` when omitted; moderation happens later.
    pub status: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDefinitionForm>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddCategoryFormPayload {
    pub name: CategoryName,
    pub parent_id: Option<CategoryId>,
    pub status: CategoryStatus,
    pub attributes: Vec<AttributeDefinitionDraft>,
}

impl AddCategoryFormPayload {
    /// Splits the payload into the insertable category and its seed
    /// attribute definitions.
    pub fn into_parts(self) -> (NewCategory, Vec<AttributeDefinitionDraft>) {
        let now = Utc::now().naive_utc();
        let category = NewCategory {
            name: self.name,
            parent_id: self.parent_id,
            status: self.status,
            created_at: now,
            updated_at: now,
        };
        (category, self.attributes)
    }
}

impl TryFrom<AddCategoryForm> for AddCategoryFormPayload {
    type Error = CategoryFormError;

    fn try_from(value: AddCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let status = match value.status.as_deref() {
            Some(status) => CategoryStatus::try_from(status)?,
            None => CategoryStatus::Pending,
        };

        Ok(Self {
            name: CategoryName::new(value.name)?,
            parent_id: value.parent_id.map(CategoryId::new).transpose()?,
            status,
            attributes: value
                .attributes
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<_>, AttributeFormError>>()?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub parent_id: Option<i32>,
    /// When present, the full desired attribute list to reconcile against.
    pub attributes: Option<Vec<AttributeDefinitionForm>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCategoryFormPayload {
    pub category_id: CategoryId,
    pub name: CategoryName,
    pub parent_id: Option<CategoryId>,
    pub attributes: Option<Vec<AttributeDefinitionDraft>>,
}

impl TryFrom<UpdateCategoryForm> for UpdateCategoryFormPayload {
    type Error = CategoryFormError;

    fn try_from(value: UpdateCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let attributes = value
            .attributes
            .map(|entries| {
                entries
                    .into_iter()
                    .map(TryInto::try_into)
                    .collect::<Result<Vec<_>, AttributeFormError>>()
            })
            .transpose()?;

        Ok(Self {
            category_id: CategoryId::new(value.category_id)?,
            name: CategoryName::new(value.name)?,
            parent_id: value.parent_id.map(CategoryId::new).transpose()?,
            attributes,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetCategoryStatusForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetCategoryStatusFormPayload {
    pub category_id: CategoryId,
    pub status: CategoryStatus,
}

impl TryFrom<SetCategoryStatusForm> for SetCategoryStatusFormPayload {
    type Error = CategoryFormError;

    fn try_from(value: SetCategoryStatusForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            category_id: CategoryId::new(value.category_id)?,
            status: CategoryStatus::try_from(value.status.as_str())?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteCategoryForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCategoryFormPayload {
    pub category_id: CategoryId,
}

impl TryFrom<DeleteCategoryForm> for DeleteCategoryFormPayload {
    type Error = CategoryFormError;

    fn try_from(value: DeleteCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            category_id: CategoryId::new(value.category_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_category_defaults_to_pending() {
        let form = AddCategoryForm {
            name: " Vegetables ".to_string(),
            parent_id: None,
            status: None,
            attributes: vec![],
        };

        let payload: AddCategoryFormPayload = form.try_into().unwrap();
        assert_eq!(payload.name.as_str(), "Vegetables");
        assert_eq!(payload.status, CategoryStatus::Pending);
    }

    #[test]
    fn add_category_rejects_unknown_status() {
        let form = AddCategoryForm {
            name: "Vegetables".to_string(),
            parent_id: None,
            status: Some("archived".to_string()),
            attributes: vec![],
        };

        let payload: Result<AddCategoryFormPayload, _> = form.try_into();
        assert!(payload.is_err());
    }

    #[test]
    fn update_category_keeps_attribute_list_optional() {
        let form = UpdateCategoryForm {
            category_id: 3,
            name: "Root Vegetables".to_string(),
            parent_id: Some(1),
            attributes: None,
        };

        let payload: UpdateCategoryFormPayload = form.try_into().unwrap();
        assert_eq!(payload.category_id.get(), 3);
        assert_eq!(payload.parent_id.unwrap().get(), 1);
        assert!(payload.attributes.is_none());
    }

    #[test]
    fn status_form_parses_status() {
        let form = SetCategoryStatusForm {
            category_id: 2,
            status: "approved".to_string(),
        };

        let payload: SetCategoryStatusFormPayload = form.try_into().unwrap();
        assert_eq!(payload.status, CategoryStatus::Approved);
    }
}
