use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::crop::{Crop as DomainCrop, NewCrop as DomainNewCrop};
use crate::domain::types::{CropName, TypeConstraintError};

/// Diesel model representing the `crops` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::crops)]
pub struct Crop {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Crop`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::crops)]
pub struct NewCrop {
    pub category_id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Crop> for DomainCrop {
    type Error = TypeConstraintError;

    fn try_from(crop: Crop) -> Result<Self, Self::Error> {
        Ok(Self {
            id: crop.id.try_into()?,
            name: CropName::new(crop.name)?,
            category_id: crop.category_id.try_into()?,
            created_at: crop.created_at,
            updated_at: crop.updated_at,
        })
    }
}

impl From<DomainNewCrop> for NewCrop {
    fn from(crop: DomainNewCrop) -> Self {
        Self {
            category_id: crop.category_id.get(),
            name: crop.name.into_inner(),
            created_at: crop.created_at,
            updated_at: crop.updated_at,
        }
    }
}
