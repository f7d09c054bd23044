use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::attribute::AttributeValueInput;
use crate::domain::crop::NewCrop;
use crate::domain::types::{
    AttributeDefinitionId, CategoryId, CropId, CropName, CropSortBy, TypeConstraintError,
};

/// Errors produced when converting crop forms into typed payloads.
#[derive(Debug, Error)]
pub enum CropFormError {
    #[error("crop form validation failed: {0}")]
    Validation(String),
    #[error("crop form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for CropFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for CropFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

/// One raw attribute value as submitted with a crop.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CropAttributeValueForm {
    #[validate(range(min = 1))]
    pub attribute_definition_id: i32,
    pub value: String,
}

impl TryFrom<CropAttributeValueForm> for AttributeValueInput {
    type Error = CropFormError;

    fn try_from(value: CropAttributeValueForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            attribute_definition_id: AttributeDefinitionId::new(value.attribute_definition_id)?,
            value: value.value,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddCropForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[serde(default)]
    pub attributes: Vec<CropAttributeValueForm>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddCropFormPayload {
    pub name: CropName,
    pub category_id: CategoryId,
    pub attributes: Vec<AttributeValueInput>,
}

impl AddCropFormPayload {
    /// Splits the payload into the insertable crop and its raw values.
    pub fn into_parts(self) -> (NewCrop, Vec<AttributeValueInput>) {
        let now = Utc::now().naive_utc();
        let crop = NewCrop {
            name: self.name,
            category_id: self.category_id,
            created_at: now,
            updated_at: now,
        };
        (crop, self.attributes)
    }
}

impl TryFrom<AddCropForm> for AddCropFormPayload {
    type Error = CropFormError;

    fn try_from(value: AddCropForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            name: CropName::new(value.name)?,
            category_id: CategoryId::new(value.category_id)?,
            attributes: value
                .attributes
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCropForm {
    #[validate(range(min = 1))]
    pub crop_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[serde(default)]
    pub attributes: Vec<CropAttributeValueForm>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCropFormPayload {
    pub crop_id: CropId,
    pub name: CropName,
    pub category_id: CategoryId,
    pub attributes: Vec<AttributeValueInput>,
}

impl TryFrom<UpdateCropForm> for UpdateCropFormPayload {
    type Error = CropFormError;

    fn try_from(value: UpdateCropForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            crop_id: CropId::new(value.crop_id)?,
            name: CropName::new(value.name)?,
            category_id: CategoryId::new(value.category_id)?,
            attributes: value
                .attributes
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteCropForm {
    #[validate(range(min = 1))]
    pub crop_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCropFormPayload {
    pub crop_id: CropId,
}

impl TryFrom<DeleteCropForm> for DeleteCropFormPayload {
    type Error = CropFormError;

    fn try_from(value: DeleteCropForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            crop_id: CropId::new(value.crop_id)?,
        })
    }
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct SearchCropsForm {
    pub search_term: Option<String>,
    pub category_id: Option<i32>,
    /// Exact-match filters keyed by attribute definition id.
    #[serde(default)]
    pub attribute_filters: HashMap<i32, String>,
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_descending: bool,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropSearchPayload {
    pub search_term: Option<String>,
    pub category_id: Option<CategoryId>,
    pub attribute_filters: HashMap<AttributeDefinitionId, String>,
    pub sort_by: CropSortBy,
    pub sort_descending: bool,
    pub page: usize,
    pub page_size: usize,
}

impl Default for CropSearchPayload {
    fn default() -> Self {
        Self {
            search_term: None,
            category_id: None,
            attribute_filters: HashMap::new(),
            sort_by: CropSortBy::default(),
            sort_descending: false,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl TryFrom<SearchCropsForm> for CropSearchPayload {
    type Error = CropFormError;

    fn try_from(value: SearchCropsForm) -> Result<Self, Self::Error> {
        if value.page == 0 || value.page_size == 0 {
            return Err(CropFormError::Validation(
                "page and page_size are 1-indexed and must be positive".to_string(),
            ));
        }

        let attribute_filters = value
            .attribute_filters
            .into_iter()
            .map(|(id, filter)| Ok((AttributeDefinitionId::new(id)?, filter)))
            .collect::<Result<HashMap<_, _>, TypeConstraintError>>()?;

        Ok(Self {
            search_term: value
                .search_term
                .map(|term| term.trim().to_string())
                .filter(|term| !term.is_empty()),
            category_id: value.category_id.map(CategoryId::new).transpose()?,
            attribute_filters,
            sort_by: match value.sort_by.as_deref() {
                Some(sort_by) => CropSortBy::try_from(sort_by)?,
                None => CropSortBy::default(),
            },
            sort_descending: value.sort_descending,
            page: value.page,
            page_size: value.page_size,
        })
    }
}
