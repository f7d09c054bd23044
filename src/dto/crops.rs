use std::collections::HashMap;

/// One attribute value on a crop, labeled with its definition.
#[derive(Debug, Clone, PartialEq)]
pub struct CropAttributeValueDto {
    pub attribute_definition_id: i32,
    pub name: String,
    pub value: String,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropDto {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub attributes: Vec<CropAttributeValueDto>,
}

/// Search listing row.
#[derive(Debug, Clone, PartialEq)]
pub struct CropListDto {
    pub id: i32,
    pub name: String,
    pub category_name: String,
    pub offer_count: usize,
}

/// Result of one catalog search: the requested page plus pagination
/// figures and the facet map driving further narrowing in the UI.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CropSearchResultDto {
    pub items: Vec<CropListDto>,
    pub total_count: usize,
    pub page_count: usize,
    /// Distinct values per attribute definition across the whole filtered
    /// set, independent of pagination.
    pub available_attribute_values: HashMap<i32, Vec<String>>,
}
