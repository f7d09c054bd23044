use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, CategoryName, CategoryStatus};

/// A node in the crop classification hierarchy.
///
/// `parent_id` is a weak reference; the parent chain is acyclic and ends at
/// a root category with no parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub parent_id: Option<CategoryId>,
    pub status: CategoryStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert a new [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub parent_id: Option<CategoryId>,
    pub status: CategoryStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
