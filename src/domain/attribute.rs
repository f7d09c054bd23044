use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AttributeDataType, AttributeDefinitionId, AttributeName, AttributeUnit, CategoryId,
    CropAttributeValueId, CropId, TypeConstraintError,
};

/// A named, typed field declared on a category.
///
/// Definitions are owned exclusively by their category; `(category_id,
/// name)` is unique across the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub id: AttributeDefinitionId,
    pub category_id: CategoryId,
    pub name: AttributeName,
    pub data_type: AttributeDataType,
    pub is_required: bool,
    /// Optional constraint interpreted per `data_type`: an inclusive
    /// `"min-max"` range for numbers, an anchored regex for strings.
    pub validation_rule: Option<String>,
    pub unit: Option<AttributeUnit>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert a new [`AttributeDefinition`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAttributeDefinition {
    pub category_id: CategoryId,
    pub name: AttributeName,
    pub data_type: AttributeDataType,
    pub is_required: bool,
    pub validation_rule: Option<String>,
    pub unit: Option<AttributeUnit>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One entry of a desired attribute list handed to the registry for
/// reconciliation. Entries without an `id` are inserted; entries carrying
/// one update the matching stored definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeDefinitionDraft {
    pub id: Option<AttributeDefinitionId>,
    pub name: AttributeName,
    pub data_type: AttributeDataType,
    pub is_required: bool,
    pub validation_rule: Option<String>,
    pub unit: Option<AttributeUnit>,
}

/// Stored raw value of one attribute on one crop.
///
/// `(crop_id, attribute_definition_id)` is unique; the referenced
/// definition always belongs to the crop's category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropAttributeValue {
    pub id: CropAttributeValueId,
    pub crop_id: CropId,
    pub attribute_definition_id: AttributeDefinitionId,
    pub value: String,
}

/// Raw `(definition, value)` pair submitted for a crop, before validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeValueInput {
    pub attribute_definition_id: AttributeDefinitionId,
    pub value: String,
}

/// A raw attribute value interpreted against its definition's data type.
///
/// Produced only by the validator; code past the validation boundary works
/// with this variant instead of trusting the stored text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    String(String),
    Number(f64),
    Date(NaiveDateTime),
    Bool(bool),
}

impl AttributeValue {
    /// Interprets raw text according to the declared data type.
    ///
    /// Dates accept an ISO-8601 date (`2026-04-01`, normalized to
    /// midnight) or a naive datetime (`2026-04-01T08:30:00`); booleans
    /// accept `true`/`false` in any casing.
    pub fn parse(raw: &str, data_type: AttributeDataType) -> Result<Self, TypeConstraintError> {
        let raw = raw.trim();
        match data_type {
            AttributeDataType::String => Ok(Self::String(raw.to_string())),
            AttributeDataType::Number => raw
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Self::Number)
                .ok_or_else(|| {
                    TypeConstraintError::InvalidValue(format!("not a number: {raw}"))
                }),
            AttributeDataType::Date => raw
                .parse::<NaiveDateTime>()
                .or_else(|_| {
                    raw.parse::<chrono::NaiveDate>()
                        .map(|d| d.and_time(NaiveTime::MIN))
                })
                .map(Self::Date)
                .map_err(|_| TypeConstraintError::InvalidValue(format!("not a date: {raw}"))),
            AttributeDataType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                _ => Err(TypeConstraintError::InvalidValue(format!(
                    "not a boolean: {raw}"
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers() {
        assert_eq!(
            AttributeValue::parse("42", AttributeDataType::Number).unwrap(),
            AttributeValue::Number(42.0)
        );
        assert!(AttributeValue::parse("abc", AttributeDataType::Number).is_err());
        assert!(AttributeValue::parse("NaN", AttributeDataType::Number).is_err());
    }

    #[test]
    fn parses_dates_with_and_without_time() {
        let midnight = AttributeValue::parse("2026-04-01", AttributeDataType::Date).unwrap();
        let timed = AttributeValue::parse("2026-04-01T08:30:00", AttributeDataType::Date).unwrap();
        match (midnight, timed) {
            (AttributeValue::Date(a), AttributeValue::Date(b)) => {
                assert_eq!(a.date(), b.date());
                assert!(a < b);
            }
            other => panic!("expected dates, got {other:?}"),
        }
        assert!(AttributeValue::parse("spring", AttributeDataType::Date).is_err());
    }

    #[test]
    fn parses_booleans_case_insensitively() {
        assert_eq!(
            AttributeValue::parse("True", AttributeDataType::Boolean).unwrap(),
            AttributeValue::Bool(true)
        );
        assert!(AttributeValue::parse("yes", AttributeDataType::Boolean).is_err());
    }

    #[test]
    fn strings_pass_through_trimmed() {
        assert_eq!(
            AttributeValue::parse("  Spring ", AttributeDataType::String).unwrap(),
            AttributeValue::String("Spring".into())
        );
    }
}
