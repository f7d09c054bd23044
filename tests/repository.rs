use chrono::Utc;
use diesel::prelude::*;
use greenmarket_catalog::domain::attribute::{
    AttributeDefinitionDraft, AttributeValueInput, NewAttributeDefinition,
};
use greenmarket_catalog::domain::category::NewCategory;
use greenmarket_catalog::domain::crop::NewCrop;
use greenmarket_catalog::domain::types::{
    AttributeDataType, AttributeDefinitionId, AttributeName, CategoryId, CategoryName,
    CategoryStatus, CropName,
};
use greenmarket_catalog::repository::{
    AttributeDefinitionReader, AttributeDefinitionWriter, CategoryReader, CategoryWriter,
    CropListQuery, CropReader, CropWriter, DieselRepository,
};
use greenmarket_catalog::schema::offers;

mod common;

fn new_category(name: &str, parent_id: Option<CategoryId>) -> NewCategory {
    let now = Utc::now().naive_utc();
    NewCategory {
        name: CategoryName::new(name).expect("valid category name"),
        parent_id,
        status: CategoryStatus::Approved,
        created_at: now,
        updated_at: now,
    }
}

fn draft(name: &str, data_type: AttributeDataType, is_required: bool) -> AttributeDefinitionDraft {
    AttributeDefinitionDraft {
        id: None,
        name: AttributeName::new(name).expect("valid attribute name"),
        data_type,
        is_required,
        validation_rule: None,
        unit: None,
    }
}

fn new_crop(name: &str, category_id: CategoryId) -> NewCrop {
    let now = Utc::now().naive_utc();
    NewCrop {
        name: CropName::new(name).expect("valid crop name"),
        category_id,
        created_at: now,
        updated_at: now,
    }
}

fn value(definition_id: AttributeDefinitionId, raw: &str) -> AttributeValueInput {
    AttributeValueInput {
        attribute_definition_id: definition_id,
        value: raw.to_string(),
    }
}

#[test]
fn create_category_seeds_attribute_definitions() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let category = repo
        .create_category(
            &new_category("Vegetables", None),
            &[
                draft("GrowingSeason", AttributeDataType::String, true),
                draft("Weight", AttributeDataType::Number, false),
            ],
        )
        .expect("should create category");

    let stored = repo
        .get_category_by_id(category.id)
        .expect("should get category")
        .expect("category should exist");
    assert_eq!(stored.name.as_str(), "Vegetables");
    assert_eq!(stored.status, CategoryStatus::Approved);

    let attributes = repo
        .list_attributes_by_category(category.id)
        .expect("should list attributes");
    let names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["GrowingSeason", "Weight"]);
}

#[test]
fn update_category_reassigns_parent_and_reconciles_definitions() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let root = repo
        .create_category(&new_category("Vegetables", None), &[])
        .expect("should create root");
    let child = repo
        .create_category(
            &new_category("Roots", None),
            &[
                draft("GrowingSeason", AttributeDataType::String, true),
                draft("Organic", AttributeDataType::Boolean, false),
            ],
        )
        .expect("should create child");

    let stored = repo
        .list_attributes_by_category(child.id)
        .expect("should list attributes");
    let season_id = stored
        .iter()
        .find(|a| a.name.as_str() == "GrowingSeason")
        .expect("seeded definition should exist")
        .id;

    // Keep+rename GrowingSeason, drop Organic, add Weight.
    let desired = vec![
        AttributeDefinitionDraft {
            id: Some(season_id),
            ..draft("Season", AttributeDataType::String, true)
        },
        draft("Weight", AttributeDataType::Number, false),
    ];
    let affected = repo
        .update_category(
            child.id,
            &CategoryName::new("Root Vegetables").unwrap(),
            Some(root.id),
            Some(&desired),
        )
        .expect("should update category");
    assert_eq!(affected, 1);

    let updated = repo
        .get_category_by_id(child.id)
        .expect("should get category")
        .expect("category should exist");
    assert_eq!(updated.name.as_str(), "Root Vegetables");
    assert_eq!(updated.parent_id, Some(root.id));

    let attributes = repo
        .list_attributes_by_category(child.id)
        .expect("should list attributes");
    let names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Season", "Weight"]);
    assert_eq!(
        attributes.iter().find(|a| a.name.as_str() == "Season").unwrap().id,
        season_id
    );
}

#[test]
fn attribute_names_are_unique_per_category_only() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let vegetables = repo
        .create_category(&new_category("Vegetables", None), &[])
        .expect("should create category");
    let fruit = repo
        .create_category(&new_category("Fruit", None), &[])
        .expect("should create category");

    let now = Utc::now().naive_utc();
    let definition = NewAttributeDefinition {
        category_id: vegetables.id,
        name: AttributeName::new("GrowingSeason").unwrap(),
        data_type: AttributeDataType::String,
        is_required: true,
        validation_rule: None,
        unit: None,
        created_at: now,
        updated_at: now,
    };

    repo.create_attribute(&definition)
        .expect("first definition should insert");
    assert!(repo.create_attribute(&definition).is_err());

    let elsewhere = NewAttributeDefinition {
        category_id: fruit.id,
        ..definition
    };
    repo.create_attribute(&elsewhere)
        .expect("same name under another category should insert");
}

#[test]
fn delete_attribute_cascades_over_crop_values() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let category = repo
        .create_category(
            &new_category("Vegetables", None),
            &[draft("GrowingSeason", AttributeDataType::String, true)],
        )
        .expect("should create category");
    let definition = repo
        .list_attributes_by_category(category.id)
        .expect("should list attributes")
        .remove(0);

    let crop = repo
        .create_crop(
            &new_crop("Carrot", category.id),
            &[value(definition.id, "Spring")],
        )
        .expect("should create crop");

    repo.delete_attribute(definition.id)
        .expect("should delete definition");

    assert!(
        repo.get_attribute_by_id(definition.id)
            .expect("should query definition")
            .is_none()
    );
    assert!(
        repo.list_crop_attributes(&[crop.id])
            .expect("should list crop attributes")
            .is_empty()
    );
}

#[test]
fn delete_category_removes_definitions_and_their_values() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let category = repo
        .create_category(
            &new_category("Vegetables", None),
            &[draft("GrowingSeason", AttributeDataType::String, true)],
        )
        .expect("should create category");
    let definition = repo
        .list_attributes_by_category(category.id)
        .expect("should list attributes")
        .remove(0);

    let crop = repo
        .create_crop(
            &new_crop("Carrot", category.id),
            &[value(definition.id, "Spring")],
        )
        .expect("should create crop");
    repo.delete_crop(crop.id).expect("should delete crop");

    let deleted = repo
        .delete_category(category.id)
        .expect("should delete category");
    assert_eq!(deleted, 1);
    assert!(
        repo.get_category_by_id(category.id)
            .expect("should query category")
            .is_none()
    );
    assert!(
        repo.list_attributes_by_category(category.id)
            .expect("should list attributes")
            .is_empty()
    );
}

#[test]
fn update_crop_diffs_attribute_values_in_place() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let category = repo
        .create_category(
            &new_category("Vegetables", None),
            &[
                draft("GrowingSeason", AttributeDataType::String, false),
                draft("Weight", AttributeDataType::Number, false),
            ],
        )
        .expect("should create category");
    let attributes = repo
        .list_attributes_by_category(category.id)
        .expect("should list attributes");
    let season = attributes
        .iter()
        .find(|a| a.name.as_str() == "GrowingSeason")
        .unwrap()
        .id;
    let weight = attributes
        .iter()
        .find(|a| a.name.as_str() == "Weight")
        .unwrap()
        .id;

    let crop = repo
        .create_crop(&new_crop("Carrot", category.id), &[value(season, "Spring")])
        .expect("should create crop");

    // Drop the season value, add a weight value.
    repo.update_crop(
        crop.id,
        &CropName::new("Carrot").unwrap(),
        category.id,
        &[value(weight, "1.5")],
    )
    .expect("should update crop");

    let stored = repo
        .list_crop_attributes(&[crop.id])
        .expect("should list crop attributes");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].attribute_definition_id, weight);
    assert_eq!(stored[0].value, "1.5");
}

#[test]
fn list_crops_filters_by_category_set_and_name() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let vegetables = repo
        .create_category(&new_category("Vegetables", None), &[])
        .expect("should create category");
    let fruit = repo
        .create_category(&new_category("Fruit", None), &[])
        .expect("should create category");

    repo.create_crop(&new_crop("Carrot", vegetables.id), &[])
        .expect("should create crop");
    repo.create_crop(&new_crop("Beet", vegetables.id), &[])
        .expect("should create crop");
    repo.create_crop(&new_crop("Apple", fruit.id), &[])
        .expect("should create crop");

    let scoped = repo
        .list_crops(&CropListQuery::default().categories(vec![vegetables.id]))
        .expect("should list crops");
    let names: Vec<&str> = scoped.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Carrot", "Beet"]);

    let searched = repo
        .list_crops(&CropListQuery::default().search("car"))
        .expect("should list crops");
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].name.as_str(), "Carrot");
}

#[test]
fn counts_offers_per_crop() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let category = repo
        .create_category(&new_category("Vegetables", None), &[])
        .expect("should create category");
    let carrot = repo
        .create_crop(&new_crop("Carrot", category.id), &[])
        .expect("should create crop");
    let beet = repo
        .create_crop(&new_crop("Beet", category.id), &[])
        .expect("should create crop");

    let mut conn = test_db
        .pool()
        .get()
        .expect("should acquire DB connection for setup");
    for (crop_id, price) in [(carrot.id, 2.5_f64), (carrot.id, 3.0), (beet.id, 1.0)] {
        diesel::insert_into(offers::table)
            .values((
                offers::crop_id.eq(crop_id.get()),
                offers::price.eq(price),
                offers::amount.eq(10.0_f64),
            ))
            .execute(&mut conn)
            .expect("should create offer");
    }

    let counts = repo
        .count_offers_by_crop(&[carrot.id, beet.id])
        .expect("should count offers");
    assert_eq!(counts.get(&carrot.id), Some(&2));
    assert_eq!(counts.get(&beet.id), Some(&1));
}
