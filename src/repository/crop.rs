use std::collections::{HashMap, HashSet};

use diesel::prelude::*;

use crate::domain::attribute::{AttributeValueInput, CropAttributeValue};
use crate::domain::crop::{Crop, NewCrop};
use crate::domain::types::{CategoryId, CropId, CropName};
use crate::models::attribute::{CropAttribute as DbCropAttribute, NewCropAttribute};
use crate::models::crop::{Crop as DbCrop, NewCrop as DbNewCrop};
use crate::repository::errors::RepositoryResult;
use crate::repository::{CropListQuery, CropReader, CropWriter, DieselRepository};

impl CropReader for DieselRepository {
    fn get_crop_by_id(&self, id: CropId) -> RepositoryResult<Option<Crop>> {
        use crate::schema::crops;

        let mut conn = self.conn()?;

        let crop = crops::table
            .filter(crops::id.eq(id.get()))
            .first::<DbCrop>(&mut conn)
            .optional()?;

        Ok(crop.map(TryInto::try_into).transpose()?)
    }

    fn list_crops(&self, query: &CropListQuery) -> RepositoryResult<Vec<Crop>> {
        use crate::schema::crops;

        let mut conn = self.conn()?;

        let mut items = crops::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(category_ids) = &query.category_ids {
            let raw: Vec<i32> = category_ids.iter().map(|id| id.get()).collect();
            items = items.filter(crops::category_id.eq_any(raw));
        }

        if let Some(search) = &query.search {
            // SQLite LIKE is case-insensitive for ASCII.
            items = items.filter(crops::name.like(format!("%{search}%")));
        }

        let items = items
            .order(crops::id.asc())
            .load::<DbCrop>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Crop>, _>>()?;

        Ok(items)
    }

    fn list_crop_attributes(
        &self,
        crop_ids: &[CropId],
    ) -> RepositoryResult<Vec<CropAttributeValue>> {
        use crate::schema::crop_attributes;

        if crop_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let raw: Vec<i32> = crop_ids.iter().map(|id| id.get()).collect();

        let items = crop_attributes::table
            .filter(crop_attributes::crop_id.eq_any(raw))
            .order(crop_attributes::id.asc())
            .load::<DbCropAttribute>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<CropAttributeValue>, _>>()?;

        Ok(items)
    }

    fn count_offers_by_crop(
        &self,
        crop_ids: &[CropId],
    ) -> RepositoryResult<HashMap<CropId, usize>> {
        use crate::schema::offers;

        if crop_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut conn = self.conn()?;
        let raw: Vec<i32> = crop_ids.iter().map(|id| id.get()).collect();

        let rows: Vec<i32> = offers::table
            .filter(offers::crop_id.eq_any(raw))
            .select(offers::crop_id)
            .load(&mut conn)?;

        let mut counts = HashMap::new();
        for crop_id in rows {
            *counts.entry(CropId::new(crop_id)?).or_insert(0) += 1;
        }

        Ok(counts)
    }
}

impl CropWriter for DieselRepository {
    fn create_crop(
        &self,
        crop: &NewCrop,
        values: &[AttributeValueInput],
    ) -> RepositoryResult<Crop> {
        use crate::schema::{crop_attributes, crops};

        let mut conn = self.conn()?;

        let created = conn.transaction(|conn| {
            let db_crop: DbNewCrop = crop.clone().into();

            let created: DbCrop = diesel::insert_into(crops::table)
                .values(db_crop)
                .get_result(conn)?;

            for value in values {
                let row = NewCropAttribute {
                    crop_id: created.id,
                    attribute_definition_id: value.attribute_definition_id.get(),
                    value: value.value.clone(),
                };
                diesel::insert_into(crop_attributes::table)
                    .values(row)
                    .execute(conn)?;
            }

            QueryResult::Ok(created)
        })?;

        Ok(created.try_into()?)
    }

    fn update_crop(
        &self,
        id: CropId,
        name: &CropName,
        category_id: CategoryId,
        values: &[AttributeValueInput],
    ) -> RepositoryResult<usize> {
        use crate::schema::{crop_attributes, crops};

        let mut conn = self.conn()?;

        let affected = conn.transaction(|conn| {
            let affected = diesel::update(crops::table.filter(crops::id.eq(id.get())))
                .set((
                    crops::name.eq(name.as_str()),
                    crops::category_id.eq(category_id.get()),
                    crops::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)?;

            let existing: Vec<DbCropAttribute> = crop_attributes::table
                .filter(crop_attributes::crop_id.eq(id.get()))
                .load(conn)?;

            let desired_ids: HashSet<i32> = values
                .iter()
                .map(|v| v.attribute_definition_id.get())
                .collect();
            let existing_ids: HashSet<i32> =
                existing.iter().map(|row| row.attribute_definition_id).collect();

            for row in &existing {
                if !desired_ids.contains(&row.attribute_definition_id) {
                    diesel::delete(
                        crop_attributes::table.filter(crop_attributes::id.eq(row.id)),
                    )
                    .execute(conn)?;
                }
            }

            for value in values {
                let definition_id = value.attribute_definition_id.get();
                if existing_ids.contains(&definition_id) {
                    diesel::update(
                        crop_attributes::table
                            .filter(crop_attributes::crop_id.eq(id.get()))
                            .filter(
                                crop_attributes::attribute_definition_id.eq(definition_id),
                            ),
                    )
                    .set(crop_attributes::value.eq(&value.value))
                    .execute(conn)?;
                } else {
                    let row = NewCropAttribute {
                        crop_id: id.get(),
                        attribute_definition_id: definition_id,
                        value: value.value.clone(),
                    };
                    diesel::insert_into(crop_attributes::table)
                        .values(row)
                        .execute(conn)?;
                }
            }

            QueryResult::Ok(affected)
        })?;

        Ok(affected)
    }

    fn delete_crop(&self, id: CropId) -> RepositoryResult<usize> {
        use crate::schema::{crop_attributes, crops};

        let mut conn = self.conn()?;

        let affected = conn.transaction(|conn| {
            diesel::delete(
                crop_attributes::table.filter(crop_attributes::crop_id.eq(id.get())),
            )
            .execute(conn)?;

            diesel::delete(crops::table.filter(crops::id.eq(id.get()))).execute(conn)
        })?;

        Ok(affected)
    }
}
