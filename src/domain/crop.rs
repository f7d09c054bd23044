use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, CropId, CropName};

/// A crop listed by a farmer under an approved category.
///
/// The category reference is non-owning; crop attribute values are owned by
/// the crop and live in their own records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crop {
    pub id: CropId,
    pub name: CropName,
    pub category_id: CategoryId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Information required to create a new [`Crop`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCrop {
    pub name: CropName,
    pub category_id: CategoryId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
