use crate::domain::attribute::AttributeDefinition;

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinitionDto {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub data_type: String,
    pub is_required: bool,
    pub validation_rule: Option<String>,
    pub unit: Option<String>,
}

impl From<AttributeDefinition> for AttributeDefinitionDto {
    fn from(value: AttributeDefinition) -> Self {
        Self {
            id: value.id.get(),
            category_id: value.category_id.get(),
            name: value.name.into_inner(),
            data_type: value.data_type.as_str().to_string(),
            is_required: value.is_required,
            validation_rule: value.validation_rule,
            unit: value.unit.map(|u| u.into_inner()),
        }
    }
}
