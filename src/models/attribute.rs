use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::attribute::{
    AttributeDefinition as DomainAttributeDefinition, CropAttributeValue as DomainCropAttributeValue,
    NewAttributeDefinition as DomainNewAttributeDefinition,
};
use crate::domain::types::{AttributeDataType, AttributeName, AttributeUnit, TypeConstraintError};

/// Diesel model representing the `attribute_definitions` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::attribute_definitions)]
pub struct AttributeDefinition {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub data_type: String,
    pub is_required: bool,
    pub validation_rule: Option<String>,
    pub unit: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`AttributeDefinition`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::attribute_definitions)]
pub struct NewAttributeDefinition {
    pub category_id: i32,
    pub name: String,
    pub data_type: String,
    pub is_required: bool,
    pub validation_rule: Option<String>,
    pub unit: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Diesel model representing the `crop_attributes` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::crop_attributes)]
pub struct CropAttribute {
    pub id: i32,
    pub crop_id: i32,
    pub attribute_definition_id: i32,
    pub value: String,
}

/// Insertable form of [`CropAttribute`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::crop_attributes)]
pub struct NewCropAttribute {
    pub crop_id: i32,
    pub attribute_definition_id: i32,
    pub value: String,
}

impl TryFrom<AttributeDefinition> for DomainAttributeDefinition {
    type Error = TypeConstraintError;

    fn try_from(definition: AttributeDefinition) -> Result<Self, Self::Error> {
        Ok(Self {
            id: definition.id.try_into()?,
            category_id: definition.category_id.try_into()?,
            name: AttributeName::new(definition.name)?,
            data_type: AttributeDataType::try_from(definition.data_type)?,
            is_required: definition.is_required,
            validation_rule: definition.validation_rule,
            unit: definition.unit.map(AttributeUnit::new).transpose()?,
            created_at: definition.created_at,
            updated_at: definition.updated_at,
        })
    }
}

impl From<DomainNewAttributeDefinition> for NewAttributeDefinition {
    fn from(definition: DomainNewAttributeDefinition) -> Self {
        Self {
            category_id: definition.category_id.get(),
            name: definition.name.into_inner(),
            data_type: definition.data_type.as_str().to_string(),
            is_required: definition.is_required,
            validation_rule: definition.validation_rule,
            unit: definition.unit.map(AttributeUnit::into_inner),
            created_at: definition.created_at,
            updated_at: definition.updated_at,
        }
    }
}

impl TryFrom<CropAttribute> for DomainCropAttributeValue {
    type Error = TypeConstraintError;

    fn try_from(value: CropAttribute) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.try_into()?,
            crop_id: value.crop_id.try_into()?,
            attribute_definition_id: value.attribute_definition_id.try_into()?,
            value: value.value,
        })
    }
}
