use std::collections::HashSet;

use chrono::Utc;

use crate::domain::attribute::NewAttributeDefinition;
use crate::domain::types::{AttributeDefinitionId, CategoryId};
use crate::dto::attributes::AttributeDefinitionDto;
use crate::forms::attributes::{
    DefineAttributePayload, ReconcileAttributesPayload, UpdateAttributePayload,
};
use crate::repository::{AttributeDefinitionReader, AttributeDefinitionWriter, CategoryReader};

use super::{ServiceError, ServiceResult};

pub fn category_attributes<R>(
    category_id: CategoryId,
    repo: &R,
) -> ServiceResult<Vec<AttributeDefinitionDto>>
where
    R: CategoryReader + AttributeDefinitionReader,
{
    match repo.get_category_by_id(category_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    }

    match repo.list_attributes_by_category(category_id) {
        Ok(attributes) => Ok(attributes
            .into_iter()
            .map(AttributeDefinitionDto::from)
            .collect()),
        Err(e) => {
            log::error!("Failed to list category attributes: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn define_attribute<R>(
    payload: DefineAttributePayload,
    repo: &R,
) -> ServiceResult<AttributeDefinitionDto>
where
    R: CategoryReader + AttributeDefinitionReader + AttributeDefinitionWriter,
{
    match repo.get_category_by_id(payload.category_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    }

    let existing = match repo.list_attributes_by_category(payload.category_id) {
        Ok(existing) => existing,
        Err(e) => {
            log::error!("Failed to list category attributes: {e}");
            return Err(ServiceError::Internal);
        }
    };
    if existing.iter().any(|a| a.name == payload.draft.name) {
        return Err(ServiceError::Conflict(format!(
            "an attribute named '{}' already exists in this category",
            payload.draft.name
        )));
    }

    let now = Utc::now().naive_utc();
    let definition = NewAttributeDefinition {
        category_id: payload.category_id,
        name: payload.draft.name,
        data_type: payload.draft.data_type,
        is_required: payload.draft.is_required,
        validation_rule: payload.draft.validation_rule,
        unit: payload.draft.unit,
        created_at: now,
        updated_at: now,
    };

    match repo.create_attribute(&definition) {
        Ok(created) => Ok(AttributeDefinitionDto::from(created)),
        Err(e) => {
            log::error!("Failed to create attribute definition: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn update_attribute<R>(
    payload: UpdateAttributePayload,
    repo: &R,
) -> ServiceResult<AttributeDefinitionDto>
where
    R: AttributeDefinitionReader + AttributeDefinitionWriter,
{
    let existing = match repo.get_attribute_by_id(payload.id) {
        Ok(Some(existing)) => existing,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get attribute definition: {e}");
            return Err(ServiceError::Internal);
        }
    };

    if existing.name != payload.draft.name {
        let siblings = match repo.list_attributes_by_category(existing.category_id) {
            Ok(siblings) => siblings,
            Err(e) => {
                log::error!("Failed to list category attributes: {e}");
                return Err(ServiceError::Internal);
            }
        };
        if siblings
            .iter()
            .any(|a| a.id != payload.id && a.name == payload.draft.name)
        {
            return Err(ServiceError::Conflict(format!(
                "an attribute named '{}' already exists in this category",
                payload.draft.name
            )));
        }
    }

    if let Err(e) = repo.update_attribute(payload.id, &payload.draft) {
        log::error!("Failed to update attribute definition: {e}");
        return Err(ServiceError::Internal);
    }

    match repo.get_attribute_by_id(payload.id) {
        Ok(Some(updated)) => Ok(AttributeDefinitionDto::from(updated)),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to reload attribute definition: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Deletes a definition together with every crop attribute value that
/// references it.
pub fn delete_attribute<R>(id: AttributeDefinitionId, repo: &R) -> ServiceResult<()>
where
    R: AttributeDefinitionReader + AttributeDefinitionWriter,
{
    match repo.get_attribute_by_id(id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get attribute definition: {e}");
            return Err(ServiceError::Internal);
        }
    }

    if let Err(e) = repo.delete_attribute(id) {
        log::error!("Failed to delete attribute definition: {e}");
        return Err(ServiceError::Internal);
    }

    Ok(())
}

/// Replaces a category's attribute schema with the desired list: entries
/// without an id are created, entries matching a stored definition update
/// it, and stored definitions absent from the list are cascade-deleted.
pub fn reconcile_attributes<R>(
    payload: ReconcileAttributesPayload,
    repo: &R,
) -> ServiceResult<Vec<AttributeDefinitionDto>>
where
    R: CategoryReader + AttributeDefinitionReader + AttributeDefinitionWriter,
{
    match repo.get_category_by_id(payload.category_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    }

    let mut names = HashSet::new();
    for draft in &payload.attributes {
        if !names.insert(draft.name.clone()) {
            return Err(ServiceError::Conflict(format!(
                "attribute name '{}' appears more than once in the desired list",
                draft.name
            )));
        }
    }

    match repo.reconcile_attributes(payload.category_id, &payload.attributes) {
        Ok(definitions) => Ok(definitions
            .into_iter()
            .map(AttributeDefinitionDto::from)
            .collect()),
        Err(e) => {
            log::error!("Failed to reconcile attribute definitions: {e}");
            Err(ServiceError::Internal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribute::{
        AttributeDefinition, AttributeDefinitionDraft, CropAttributeValue,
    };
    use crate::domain::category::Category;
    use crate::domain::types::{
        AttributeDataType, AttributeName, CategoryName, CategoryStatus, CropAttributeValueId,
        CropId,
    };
    use crate::repository::test::TestRepository;
    use crate::repository::CropReader;
    use chrono::{DateTime, NaiveDateTime};

    fn ts() -> NaiveDateTime {
        DateTime::from_timestamp(0, 0).unwrap().naive_utc()
    }

    fn category(id: i32, name: &str) -> Category {
        Category {
            id: CategoryId::new(id).unwrap(),
            name: CategoryName::new(name).unwrap(),
            parent_id: None,
            status: CategoryStatus::Approved,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn definition(id: i32, category_id: i32, name: &str) -> AttributeDefinition {
        AttributeDefinition {
            id: AttributeDefinitionId::new(id).unwrap(),
            category_id: CategoryId::new(category_id).unwrap(),
            name: AttributeName::new(name).unwrap(),
            data_type: AttributeDataType::String,
            is_required: false,
            validation_rule: None,
            unit: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn draft(id: Option<i32>, name: &str) -> AttributeDefinitionDraft {
        AttributeDefinitionDraft {
            id: id.map(|i| AttributeDefinitionId::new(i).unwrap()),
            name: AttributeName::new(name).unwrap(),
            data_type: AttributeDataType::String,
            is_required: false,
            validation_rule: None,
            unit: None,
        }
    }

    fn define_payload(category_id: i32, name: &str) -> DefineAttributePayload {
        DefineAttributePayload {
            category_id: CategoryId::new(category_id).unwrap(),
            draft: draft(None, name),
        }
    }

    #[test]
    fn duplicate_name_in_same_category_conflicts() {
        let repo = TestRepository::new()
            .with_categories(vec![category(1, "Vegetables"), category(2, "Fruit")])
            .with_attributes(vec![definition(1, 1, "GrowingSeason")]);

        let err = define_attribute(define_payload(1, "GrowingSeason"), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // Same name under a different category is fine.
        let dto = define_attribute(define_payload(2, "GrowingSeason"), &repo).unwrap();
        assert_eq!(dto.category_id, 2);
    }

    #[test]
    fn define_requires_existing_category() {
        let repo = TestRepository::new();
        let err = define_attribute(define_payload(7, "GrowingSeason"), &repo).unwrap_err();
        assert_eq!(err, ServiceError::NotFound);
    }

    #[test]
    fn rename_onto_sibling_conflicts() {
        let repo = TestRepository::new()
            .with_categories(vec![category(1, "Vegetables")])
            .with_attributes(vec![
                definition(1, 1, "GrowingSeason"),
                definition(2, 1, "Organic"),
            ]);

        let payload = UpdateAttributePayload {
            id: AttributeDefinitionId::new(2).unwrap(),
            draft: draft(Some(2), "GrowingSeason"),
        };
        let err = update_attribute(payload, &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let payload = UpdateAttributePayload {
            id: AttributeDefinitionId::new(2).unwrap(),
            draft: draft(Some(2), "Certified Organic"),
        };
        let dto = update_attribute(payload, &repo).unwrap();
        assert_eq!(dto.name, "Certified Organic");
    }

    #[test]
    fn delete_cascades_over_crop_values() {
        let repo = TestRepository::new()
            .with_categories(vec![category(1, "Vegetables")])
            .with_attributes(vec![definition(1, 1, "GrowingSeason")])
            .with_values(vec![CropAttributeValue {
                id: CropAttributeValueId::new(1).unwrap(),
                crop_id: CropId::new(1).unwrap(),
                attribute_definition_id: AttributeDefinitionId::new(1).unwrap(),
                value: "Spring".to_string(),
            }]);

        delete_attribute(AttributeDefinitionId::new(1).unwrap(), &repo).unwrap();

        assert!(repo
            .get_attribute_by_id(AttributeDefinitionId::new(1).unwrap())
            .unwrap()
            .is_none());
        assert!(repo
            .list_crop_attributes(&[CropId::new(1).unwrap()])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn reconcile_applies_set_diff() {
        let repo = TestRepository::new()
            .with_categories(vec![category(1, "Vegetables")])
            .with_attributes(vec![
                definition(1, 1, "GrowingSeason"),
                definition(2, 1, "Organic"),
            ]);

        // Keep+rename 1, drop 2, add a new one.
        let payload = ReconcileAttributesPayload {
            category_id: CategoryId::new(1).unwrap(),
            attributes: vec![draft(Some(1), "Season"), draft(None, "Weight")],
        };

        let result = reconcile_attributes(payload, &repo).unwrap();
        let names: Vec<&str> = result.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Season", "Weight"]);
        assert!(repo
            .get_attribute_by_id(AttributeDefinitionId::new(2).unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn reconcile_rejects_duplicate_desired_names() {
        let repo = TestRepository::new().with_categories(vec![category(1, "Vegetables")]);

        let payload = ReconcileAttributesPayload {
            category_id: CategoryId::new(1).unwrap(),
            attributes: vec![draft(None, "Weight"), draft(None, "Weight")],
        };

        let err = reconcile_attributes(payload, &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }
}
