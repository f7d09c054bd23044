use crate::domain::category::Category;
use crate::dto::attributes::AttributeDefinitionDto;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub status: String,
}

impl From<Category> for CategoryDto {
    fn from(value: Category) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.into_inner(),
            parent_id: value.parent_id.map(|id| id.get()),
            status: value.status.as_str().to_string(),
        }
    }
}

/// One category with its attribute schema and direct children.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDetailsDto {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub status: String,
    pub attributes: Vec<AttributeDefinitionDto>,
    pub children: Vec<CategoryDto>,
}

/// A category with its full descendant subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTreeDto {
    pub id: i32,
    pub name: String,
    pub status: String,
    pub children: Vec<CategoryTreeDto>,
}
