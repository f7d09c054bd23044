use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::attribute::{AttributeDefinition, AttributeDefinitionDraft, NewAttributeDefinition};
use crate::domain::types::{AttributeDefinitionId, AttributeUnit, CategoryId};
use crate::models::attribute::{
    AttributeDefinition as DbAttributeDefinition, NewAttributeDefinition as DbNewAttributeDefinition,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{AttributeDefinitionReader, AttributeDefinitionWriter, DieselRepository};

impl AttributeDefinitionReader for DieselRepository {
    fn list_attributes_by_category(
        &self,
        category_id: CategoryId,
    ) -> RepositoryResult<Vec<AttributeDefinition>> {
        use crate::schema::attribute_definitions;

        let mut conn = self.conn()?;

        let items = attribute_definitions::table
            .filter(attribute_definitions::category_id.eq(category_id.get()))
            .order(attribute_definitions::name.asc())
            .load::<DbAttributeDefinition>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<AttributeDefinition>, _>>()?;

        Ok(items)
    }

    fn get_attribute_by_id(
        &self,
        id: AttributeDefinitionId,
    ) -> RepositoryResult<Option<AttributeDefinition>> {
        use crate::schema::attribute_definitions;

        let mut conn = self.conn()?;

        let definition = attribute_definitions::table
            .filter(attribute_definitions::id.eq(id.get()))
            .first::<DbAttributeDefinition>(&mut conn)
            .optional()?;

        Ok(definition.map(TryInto::try_into).transpose()?)
    }
}

impl AttributeDefinitionWriter for DieselRepository {
    fn create_attribute(
        &self,
        definition: &NewAttributeDefinition,
    ) -> RepositoryResult<AttributeDefinition> {
        use crate::schema::attribute_definitions;

        let mut conn = self.conn()?;
        let row: DbNewAttributeDefinition = definition.clone().into();

        let created: DbAttributeDefinition = diesel::insert_into(attribute_definitions::table)
            .values(row)
            .get_result(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_attribute(
        &self,
        id: AttributeDefinitionId,
        draft: &AttributeDefinitionDraft,
    ) -> RepositoryResult<usize> {
        use crate::schema::attribute_definitions;

        let mut conn = self.conn()?;

        let affected = diesel::update(
            attribute_definitions::table.filter(attribute_definitions::id.eq(id.get())),
        )
        .set((
            attribute_definitions::name.eq(draft.name.as_str()),
            attribute_definitions::data_type.eq(draft.data_type.as_str()),
            attribute_definitions::is_required.eq(draft.is_required),
            attribute_definitions::validation_rule.eq(draft.validation_rule.as_deref()),
            attribute_definitions::unit.eq(draft.unit.as_ref().map(AttributeUnit::as_str)),
            attribute_definitions::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_attribute(&self, id: AttributeDefinitionId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let affected = conn.transaction(|conn| delete_definition_in(conn, id.get()))?;

        Ok(affected)
    }

    fn reconcile_attributes(
        &self,
        category_id: CategoryId,
        desired: &[AttributeDefinitionDraft],
    ) -> RepositoryResult<Vec<AttributeDefinition>> {
        use crate::schema::attribute_definitions;

        let mut conn = self.conn()?;

        let rows = conn.transaction(|conn| {
            reconcile_definitions_in(conn, category_id, desired)?;

            attribute_definitions::table
                .filter(attribute_definitions::category_id.eq(category_id.get()))
                .order(attribute_definitions::name.asc())
                .load::<DbAttributeDefinition>(conn)
        })?;

        let items = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<AttributeDefinition>, _>>()?;

        Ok(items)
    }
}

/// Deletes one definition after removing every crop attribute value that
/// references it. Runs inside the caller's transaction.
pub(crate) fn delete_definition_in(conn: &mut SqliteConnection, id: i32) -> QueryResult<usize> {
    use crate::schema::{attribute_definitions, crop_attributes};

    diesel::delete(
        crop_attributes::table.filter(crop_attributes::attribute_definition_id.eq(id)),
    )
    .execute(conn)?;

    diesel::delete(attribute_definitions::table.filter(attribute_definitions::id.eq(id)))
        .execute(conn)
}

/// Applies a desired-definition list to one category as a set diff:
/// stored-but-absent entries are cascade-deleted, entries without an id are
/// inserted, matching ids are updated in place. Runs inside the caller's
/// transaction.
pub(crate) fn reconcile_definitions_in(
    conn: &mut SqliteConnection,
    category_id: CategoryId,
    desired: &[AttributeDefinitionDraft],
) -> QueryResult<()> {
    use crate::schema::attribute_definitions;

    let existing = attribute_definitions::table
        .filter(attribute_definitions::category_id.eq(category_id.get()))
        .load::<DbAttributeDefinition>(conn)?;
    let mut unmatched: HashMap<i32, DbAttributeDefinition> =
        existing.into_iter().map(|d| (d.id, d)).collect();

    let now = Utc::now().naive_utc();

    for draft in desired {
        let matched = draft
            .id
            .map(AttributeDefinitionId::get)
            .filter(|id| unmatched.contains_key(id));

        match matched {
            Some(id) => {
                diesel::update(
                    attribute_definitions::table.filter(attribute_definitions::id.eq(id)),
                )
                .set((
                    attribute_definitions::name.eq(draft.name.as_str()),
                    attribute_definitions::data_type.eq(draft.data_type.as_str()),
                    attribute_definitions::is_required.eq(draft.is_required),
                    attribute_definitions::validation_rule.eq(draft.validation_rule.as_deref()),
                    attribute_definitions::unit.eq(draft.unit.as_ref().map(AttributeUnit::as_str)),
                    attribute_definitions::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)?;
                unmatched.remove(&id);
            }
            None => {
                let row = DbNewAttributeDefinition {
                    category_id: category_id.get(),
                    name: draft.name.as_str().to_string(),
                    data_type: draft.data_type.as_str().to_string(),
                    is_required: draft.is_required,
                    validation_rule: draft.validation_rule.clone(),
                    unit: draft.unit.clone().map(AttributeUnit::into_inner),
                    created_at: now,
                    updated_at: now,
                };
                diesel::insert_into(attribute_definitions::table)
                    .values(row)
                    .execute(conn)?;
            }
        }
    }

    for removed in unmatched.into_keys() {
        delete_definition_in(conn, removed)?;
    }

    Ok(())
}
