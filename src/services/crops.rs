use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::crop::Crop;
use crate::domain::types::{CategoryId, CategoryName, CategoryStatus, CropId, CropSortBy};
use crate::dto::crops::{CropAttributeValueDto, CropDto, CropListDto, CropSearchResultDto};
use crate::forms::crops::{
    AddCropFormPayload, CropSearchPayload, DeleteCropFormPayload, UpdateCropFormPayload,
};
use crate::repository::{
    AttributeDefinitionReader, CategoryReader, CropListQuery, CropReader, CropWriter,
};
use crate::services::categories::descendant_closure;
use crate::services::validation::validate_crop_attributes;

use super::{ServiceError, ServiceResult};

fn approved_category<R>(category_id: CategoryId, repo: &R) -> ServiceResult<()>
where
    R: CategoryReader,
{
    match repo.get_category_by_id(category_id) {
        Ok(Some(category)) if category.status == CategoryStatus::Approved => Ok(()),
        Ok(Some(_)) => Err(ServiceError::Validation(
            "crops can only be listed under approved categories".to_string(),
        )),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            Err(ServiceError::Internal)
        }
    }
}

fn crop_details<R>(crop: Crop, repo: &R) -> ServiceResult<CropDto>
where
    R: CropReader + AttributeDefinitionReader,
{
    let definitions = match repo.list_attributes_by_category(crop.category_id) {
        Ok(definitions) => definitions,
        Err(e) => {
            log::error!("Failed to list category attributes: {e}");
            return Err(ServiceError::Internal);
        }
    };
    let values = match repo.list_crop_attributes(&[crop.id]) {
        Ok(values) => values,
        Err(e) => {
            log::error!("Failed to list crop attributes: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let attributes = values
        .into_iter()
        .filter_map(|value| {
            definitions
                .iter()
                .find(|d| d.id == value.attribute_definition_id)
                .map(|definition| CropAttributeValueDto {
                    attribute_definition_id: definition.id.get(),
                    name: definition.name.as_str().to_string(),
                    value: value.value,
                    unit: definition.unit.clone().map(|u| u.into_inner()),
                })
        })
        .collect();

    Ok(CropDto {
        id: crop.id.get(),
        name: crop.name.into_inner(),
        category_id: crop.category_id.get(),
        attributes,
    })
}

pub fn create_crop<R>(payload: AddCropFormPayload, repo: &R) -> ServiceResult<CropDto>
where
    R: CategoryReader + AttributeDefinitionReader + CropReader + CropWriter,
{
    approved_category(payload.category_id, repo)?;

    let definitions = match repo.list_attributes_by_category(payload.category_id) {
        Ok(definitions) => definitions,
        Err(e) => {
            log::error!("Failed to list category attributes: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let (crop, values) = payload.into_parts();
    validate_crop_attributes(&values, &definitions)?;

    let created = match repo.create_crop(&crop, &values) {
        Ok(created) => created,
        Err(e) => {
            log::error!("Failed to create crop: {e}");
            return Err(ServiceError::Internal);
        }
    };

    crop_details(created, repo)
}

pub fn get_crop<R>(id: CropId, repo: &R) -> ServiceResult<CropDto>
where
    R: CropReader + AttributeDefinitionReader,
{
    let crop = match repo.get_crop_by_id(id) {
        Ok(Some(crop)) => crop,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get crop: {e}");
            return Err(ServiceError::Internal);
        }
    };

    crop_details(crop, repo)
}

pub fn update_crop<R>(payload: UpdateCropFormPayload, repo: &R) -> ServiceResult<CropDto>
where
    R: CategoryReader + AttributeDefinitionReader + CropReader + CropWriter,
{
    let crop = match repo.get_crop_by_id(payload.crop_id) {
        Ok(Some(crop)) => crop,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get crop: {e}");
            return Err(ServiceError::Internal);
        }
    };

    if crop.category_id != payload.category_id {
        approved_category(payload.category_id, repo)?;
    }

    let definitions = match repo.list_attributes_by_category(payload.category_id) {
        Ok(definitions) => definitions,
        Err(e) => {
            log::error!("Failed to list category attributes: {e}");
            return Err(ServiceError::Internal);
        }
    };
    validate_crop_attributes(&payload.attributes, &definitions)?;

    if let Err(e) = repo.update_crop(
        payload.crop_id,
        &payload.name,
        payload.category_id,
        &payload.attributes,
    ) {
        log::error!("Failed to update crop: {e}");
        return Err(ServiceError::Internal);
    }

    get_crop(payload.crop_id, repo)
}

pub fn delete_crop<R>(payload: DeleteCropFormPayload, repo: &R) -> ServiceResult<()>
where
    R: CropReader + CropWriter,
{
    match repo.get_crop_by_id(payload.crop_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get crop: {e}");
            return Err(ServiceError::Internal);
        }
    }

    let offers = match repo.count_offers_by_crop(&[payload.crop_id]) {
        Ok(offers) => offers,
        Err(e) => {
            log::error!("Failed to count crop offers: {e}");
            return Err(ServiceError::Internal);
        }
    };
    if offers.get(&payload.crop_id).copied().unwrap_or(0) > 0 {
        return Err(ServiceError::Conflict(
            "cannot delete a crop with associated offers".to_string(),
        ));
    }

    if let Err(e) = repo.delete_crop(payload.crop_id) {
        log::error!("Failed to delete crop: {e}");
        return Err(ServiceError::Internal);
    }

    Ok(())
}

/// Runs the catalog search pipeline: category subtree scope, text filter,
/// conjunctive attribute filters, stable sort, pagination, and facet
/// aggregation over the filtered (pre-pagination) candidate set.
pub fn search_crops<R>(payload: CropSearchPayload, repo: &R) -> ServiceResult<CropSearchResultDto>
where
    R: CategoryReader + CropReader,
{
    let categories = match repo.list_categories() {
        Ok(categories) => categories,
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            return Err(ServiceError::Internal);
        }
    };
    let category_names: HashMap<CategoryId, CategoryName> = categories
        .iter()
        .map(|c| (c.id, c.name.clone()))
        .collect();

    let mut query = CropListQuery::default();
    if let Some(root) = payload.category_id {
        let closure = descendant_closure(root, &categories);
        query = query.categories(closure.into_iter().collect());
    }
    if let Some(term) = &payload.search_term {
        query = query.search(term.clone());
    }

    let crops = match repo.list_crops(&query) {
        Ok(crops) => crops,
        Err(e) => {
            log::error!("Failed to list crops: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let crop_ids: Vec<CropId> = crops.iter().map(|c| c.id).collect();
    let values = match repo.list_crop_attributes(&crop_ids) {
        Ok(values) => values,
        Err(e) => {
            log::error!("Failed to list crop attributes: {e}");
            return Err(ServiceError::Internal);
        }
    };
    let mut values_by_crop: HashMap<CropId, Vec<(crate::domain::types::AttributeDefinitionId, String)>> =
        HashMap::new();
    for value in values {
        values_by_crop
            .entry(value.crop_id)
            .or_default()
            .push((value.attribute_definition_id, value.value));
    }

    let mut candidates: Vec<&Crop> = crops.iter().collect();
    if !payload.attribute_filters.is_empty() {
        candidates.retain(|crop| {
            payload
                .attribute_filters
                .iter()
                .all(|(definition_id, expected)| {
                    values_by_crop.get(&crop.id).is_some_and(|values| {
                        values
                            .iter()
                            .any(|(id, value)| id == definition_id && value == expected)
                    })
                })
        });
    }

    // Everything past this point only reorders or slices the candidates.
    let total_count = candidates.len();

    let candidate_ids: Vec<CropId> = candidates.iter().map(|c| c.id).collect();
    let offer_counts = match repo.count_offers_by_crop(&candidate_ids) {
        Ok(offer_counts) => offer_counts,
        Err(e) => {
            log::error!("Failed to count crop offers: {e}");
            return Err(ServiceError::Internal);
        }
    };

    // Candidates arrive in insertion order; the sort is stable, so ties
    // keep that order and repeated searches stay deterministic.
    let descending = payload.sort_descending;
    let apply = |ordering: Ordering| if descending { ordering.reverse() } else { ordering };
    candidates.sort_by(|a, b| {
        apply(match payload.sort_by {
            CropSortBy::Name => a.name.cmp(&b.name),
            CropSortBy::Category => {
                let left = category_names.get(&a.category_id).map(|n| n.as_str());
                let right = category_names.get(&b.category_id).map(|n| n.as_str());
                left.cmp(&right)
            }
            CropSortBy::Offers => {
                let left = offer_counts.get(&a.id).copied().unwrap_or(0);
                let right = offer_counts.get(&b.id).copied().unwrap_or(0);
                left.cmp(&right)
            }
        })
    });

    let page_count = total_count.div_ceil(payload.page_size);
    let items: Vec<CropListDto> = candidates
        .iter()
        .skip((payload.page - 1) * payload.page_size)
        .take(payload.page_size)
        .map(|crop| CropListDto {
            id: crop.id.get(),
            name: crop.name.as_str().to_string(),
            category_name: category_names
                .get(&crop.category_id)
                .map(|n| n.as_str().to_string())
                .unwrap_or_default(),
            offer_count: offer_counts.get(&crop.id).copied().unwrap_or(0),
        })
        .collect();

    let mut available_attribute_values: HashMap<i32, Vec<String>> = HashMap::new();
    for crop in &candidates {
        if let Some(values) = values_by_crop.remove(&crop.id) {
            for (definition_id, value) in values {
                let entry = available_attribute_values
                    .entry(definition_id.get())
                    .or_default();
                if !entry.contains(&value) {
                    entry.push(value);
                }
            }
        }
    }

    Ok(CropSearchResultDto {
        items,
        total_count,
        page_count,
        available_attribute_values,
    })
}
