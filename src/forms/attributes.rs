use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::attribute::AttributeDefinitionDraft;
use crate::domain::types::{
    AttributeDataType, AttributeDefinitionId, AttributeName, AttributeUnit, CategoryId,
    TypeConstraintError,
};

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Errors produced when converting attribute forms into typed payloads.
#[derive(Debug, Error)]
pub enum AttributeFormError {
    #[error("attribute form validation failed: {0}")]
    Validation(String),
    #[error("attribute form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for AttributeFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for AttributeFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

/// One attribute definition entry as submitted by a caller, reused by the
/// category create/update forms and the registry forms.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttributeDefinitionForm {
    /// Present when the entry refers to an existing definition.
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub is_required: bool,
    pub validation_rule: Option<String>,
    pub unit: Option<String>,
}

impl TryFrom<AttributeDefinitionForm> for AttributeDefinitionDraft {
    type Error = AttributeFormError;

    fn try_from(value: AttributeDefinitionForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            id: value.id.map(AttributeDefinitionId::new).transpose()?,
            name: AttributeName::new(value.name)?,
            data_type: AttributeDataType::try_from(value.data_type.as_str())?,
            is_required: value.is_required,
            validation_rule: normalize_optional(value.validation_rule),
            unit: normalize_optional(value.unit)
                .map(AttributeUnit::new)
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DefineAttributeForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[validate(nested)]
    pub attribute: AttributeDefinitionForm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineAttributePayload {
    pub category_id: CategoryId,
    pub draft: AttributeDefinitionDraft,
}

impl TryFrom<DefineAttributeForm> for DefineAttributePayload {
    type Error = AttributeFormError;

    fn try_from(value: DefineAttributeForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            category_id: CategoryId::new(value.category_id)?,
            draft: value.attribute.try_into()?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAttributeForm {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(nested)]
    pub attribute: AttributeDefinitionForm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAttributePayload {
    pub id: AttributeDefinitionId,
    pub draft: AttributeDefinitionDraft,
}

impl TryFrom<UpdateAttributeForm> for UpdateAttributePayload {
    type Error = AttributeFormError;

    fn try_from(value: UpdateAttributeForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            id: AttributeDefinitionId::new(value.id)?,
            draft: value.attribute.try_into()?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReconcileAttributesForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[serde(default)]
    pub attributes: Vec<AttributeDefinitionForm>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileAttributesPayload {
    pub category_id: CategoryId,
    pub attributes: Vec<AttributeDefinitionDraft>,
}

impl TryFrom<ReconcileAttributesForm> for ReconcileAttributesPayload {
    type Error = AttributeFormError;

    fn try_from(value: ReconcileAttributesForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            category_id: CategoryId::new(value.category_id)?,
            attributes: value
                .attributes
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}
