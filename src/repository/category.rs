use diesel::prelude::*;

use crate::domain::attribute::AttributeDefinitionDraft;
use crate::domain::category::{Category, NewCategory};
use crate::domain::types::{AttributeUnit, CategoryId, CategoryName, CategoryStatus};
use crate::models::attribute::NewAttributeDefinition as DbNewAttributeDefinition;
use crate::models::category::{Category as DbCategory, NewCategory as DbNewCategory};
use crate::repository::errors::RepositoryResult;
use crate::repository::{CategoryReader, CategoryWriter, DieselRepository, attribute};

impl CategoryReader for DieselRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let items = categories::table
            .order(categories::name.asc())
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(items)
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::id.eq(id.get()))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        Ok(category.map(TryInto::try_into).transpose()?)
    }

    fn count_child_categories(&self, id: CategoryId) -> RepositoryResult<usize> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let total = categories::table
            .filter(categories::parent_id.eq(Some(id.get())))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total as usize)
    }

    fn count_crops_in_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        use crate::schema::crops;

        let mut conn = self.conn()?;

        let total = crops::table
            .filter(crops::category_id.eq(id.get()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total as usize)
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(
        &self,
        category: &NewCategory,
        attributes: &[AttributeDefinitionDraft],
    ) -> RepositoryResult<Category> {
        use crate::schema::{attribute_definitions, categories};

        let mut conn = self.conn()?;

        let created = conn.transaction(|conn| {
            let db_category: DbNewCategory = category.clone().into();

            let created: DbCategory = diesel::insert_into(categories::table)
                .values(db_category)
                .get_result(conn)?;

            for draft in attributes {
                let row = DbNewAttributeDefinition {
                    category_id: created.id,
                    name: draft.name.as_str().to_string(),
                    data_type: draft.data_type.as_str().to_string(),
                    is_required: draft.is_required,
                    validation_rule: draft.validation_rule.clone(),
                    unit: draft.unit.clone().map(AttributeUnit::into_inner),
                    created_at: category.created_at,
                    updated_at: category.updated_at,
                };
                diesel::insert_into(attribute_definitions::table)
                    .values(row)
                    .execute(conn)?;
            }

            QueryResult::Ok(created)
        })?;

        Ok(created.try_into()?)
    }

    fn update_category(
        &self,
        id: CategoryId,
        name: &CategoryName,
        parent_id: Option<CategoryId>,
        attributes: Option<&[AttributeDefinitionDraft]>,
    ) -> RepositoryResult<usize> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let affected = conn.transaction(|conn| {
            let affected =
                diesel::update(categories::table.filter(categories::id.eq(id.get())))
                    .set((
                        categories::name.eq(name.as_str()),
                        categories::parent_id.eq(parent_id.map(CategoryId::get)),
                        categories::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)?;

            if let Some(desired) = attributes {
                attribute::reconcile_definitions_in(conn, id, desired)?;
            }

            QueryResult::Ok(affected)
        })?;

        Ok(affected)
    }

    fn set_category_status(
        &self,
        id: CategoryId,
        status: CategoryStatus,
    ) -> RepositoryResult<usize> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let affected = diesel::update(categories::table.filter(categories::id.eq(id.get())))
            .set((
                categories::status.eq(status.as_str()),
                categories::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let affected = conn.transaction(|conn| delete_categories_in(conn, &[id.get()]))?;

        Ok(affected)
    }

    fn delete_categories(&self, ids: &[CategoryId]) -> RepositoryResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        let affected = conn.transaction(|conn| delete_categories_in(conn, &raw_ids))?;

        Ok(affected)
    }
}

/// Removes categories together with their attribute definitions and any
/// values referencing those definitions. Runs inside the caller's
/// transaction.
fn delete_categories_in(conn: &mut SqliteConnection, ids: &[i32]) -> QueryResult<usize> {
    use crate::schema::{attribute_definitions, categories, crop_attributes};

    let owned_definitions = attribute_definitions::table
        .filter(attribute_definitions::category_id.eq_any(ids.to_vec()))
        .select(attribute_definitions::id);

    diesel::delete(
        crop_attributes::table
            .filter(crop_attributes::attribute_definition_id.eq_any(owned_definitions)),
    )
    .execute(conn)?;

    diesel::delete(
        attribute_definitions::table
            .filter(attribute_definitions::category_id.eq_any(ids.to_vec())),
    )
    .execute(conn)?;

    diesel::delete(categories::table.filter(categories::id.eq_any(ids.to_vec()))).execute(conn)
}
