use std::collections::HashMap;

use crate::db::{DbConnection, DbPool};
use crate::domain::attribute::{
    AttributeDefinition, AttributeDefinitionDraft, AttributeValueInput, CropAttributeValue,
    NewAttributeDefinition,
};
use crate::domain::category::{Category, NewCategory};
use crate::domain::crop::{Crop, NewCrop};
use crate::domain::types::{
    AttributeDefinitionId, CategoryId, CategoryName, CategoryStatus, CropId, CropName,
};
use crate::repository::errors::RepositoryResult;

pub mod attribute;
pub mod category;
pub mod crop;
pub mod errors;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between callers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters used when listing crops for search.
///
/// Only the filters the storage layer can answer cheaply live here; the
/// attribute-level filtering, sorting and pagination of the search pipeline
/// happen above the repository.
#[derive(Debug, Clone, Default)]
pub struct CropListQuery {
    /// Restrict to crops belonging to any of these categories.
    pub category_ids: Option<Vec<CategoryId>>,
    /// Case-insensitive substring match on the crop name.
    pub search: Option<String>,
}

impl CropListQuery {
    pub fn categories(mut self, category_ids: Vec<CategoryId>) -> Self {
        self.category_ids = Some(category_ids);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    /// Load the full category set, ordered by name.
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    /// Retrieve a category by its identifier.
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    /// Number of categories whose parent is `id`.
    fn count_child_categories(&self, id: CategoryId) -> RepositoryResult<usize>;
    /// Number of crops listed directly under category `id`.
    fn count_crops_in_category(&self, id: CategoryId) -> RepositoryResult<usize>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    /// Persist a new category together with its seed attribute definitions
    /// as one atomic unit.
    fn create_category(
        &self,
        category: &NewCategory,
        attributes: &[AttributeDefinitionDraft],
    ) -> RepositoryResult<Category>;
    /// Update name and parent; when `attributes` is given, reconcile the
    /// category's definitions against it in the same transaction.
    fn update_category(
        &self,
        id: CategoryId,
        name: &CategoryName,
        parent_id: Option<CategoryId>,
        attributes: Option<&[AttributeDefinitionDraft]>,
    ) -> RepositoryResult<usize>;
    /// Overwrite the moderation status.
    fn set_category_status(&self, id: CategoryId, status: CategoryStatus)
    -> RepositoryResult<usize>;
    /// Delete a category and its attribute definitions.
    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize>;
    /// Delete several categories (and their definitions) in one transaction;
    /// returns the number of categories removed.
    fn delete_categories(&self, ids: &[CategoryId]) -> RepositoryResult<usize>;
}

/// Read-only operations for attribute definitions.
pub trait AttributeDefinitionReader {
    /// List the definitions owned by a category, ordered by name.
    fn list_attributes_by_category(
        &self,
        category_id: CategoryId,
    ) -> RepositoryResult<Vec<AttributeDefinition>>;
    /// Retrieve a definition by its identifier.
    fn get_attribute_by_id(
        &self,
        id: AttributeDefinitionId,
    ) -> RepositoryResult<Option<AttributeDefinition>>;
}

/// Write operations for attribute definitions.
pub trait AttributeDefinitionWriter {
    /// Persist a new definition.
    fn create_attribute(
        &self,
        definition: &NewAttributeDefinition,
    ) -> RepositoryResult<AttributeDefinition>;
    /// Update an existing definition in place (`draft.id` is ignored).
    fn update_attribute(
        &self,
        id: AttributeDefinitionId,
        draft: &AttributeDefinitionDraft,
    ) -> RepositoryResult<usize>;
    /// Delete a definition, cascading over the crop attribute values that
    /// reference it, as one atomic unit.
    fn delete_attribute(&self, id: AttributeDefinitionId) -> RepositoryResult<usize>;
    /// Reconcile a category's stored definitions against a full desired
    /// list: absent stored entries are cascade-deleted, entries without an
    /// id are inserted, matching ids are updated. One transaction.
    fn reconcile_attributes(
        &self,
        category_id: CategoryId,
        desired: &[AttributeDefinitionDraft],
    ) -> RepositoryResult<Vec<AttributeDefinition>>;
}

/// Read-only operations for crop entities.
pub trait CropReader {
    /// Retrieve a crop by its identifier.
    fn get_crop_by_id(&self, id: CropId) -> RepositoryResult<Option<Crop>>;
    /// List crops matching the supplied query, in insertion order.
    fn list_crops(&self, query: &CropListQuery) -> RepositoryResult<Vec<Crop>>;
    /// Load the attribute values of the given crops.
    fn list_crop_attributes(
        &self,
        crop_ids: &[CropId],
    ) -> RepositoryResult<Vec<CropAttributeValue>>;
    /// Number of offers per crop, for the given crops. Crops without offers
    /// are absent from the map.
    fn count_offers_by_crop(
        &self,
        crop_ids: &[CropId],
    ) -> RepositoryResult<HashMap<CropId, usize>>;
}

/// Write operations for crop entities and their attribute values.
pub trait CropWriter {
    /// Persist a new crop together with its attribute values as one atomic
    /// unit.
    fn create_crop(
        &self,
        crop: &NewCrop,
        values: &[AttributeValueInput],
    ) -> RepositoryResult<Crop>;
    /// Update a crop and replace its attribute values with the given set
    /// (diffed in place) in one transaction.
    fn update_crop(
        &self,
        id: CropId,
        name: &CropName,
        category_id: CategoryId,
        values: &[AttributeValueInput],
    ) -> RepositoryResult<usize>;
    /// Delete a crop and its attribute values.
    fn delete_crop(&self, id: CropId) -> RepositoryResult<usize>;
}
