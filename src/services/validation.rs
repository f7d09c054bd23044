//! Validation of raw crop attribute values against a category's schema.
//!
//! All-or-nothing: the first failing attribute rejects the whole
//! submission, so no partial attribute sets ever reach storage.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::domain::attribute::{AttributeDefinition, AttributeValue, AttributeValueInput};
use crate::domain::types::AttributeDefinitionId;

use super::{ServiceError, ServiceResult};

/// A submitted value that passed validation, carrying its typed
/// interpretation alongside the raw text that gets stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAttribute {
    pub attribute_definition_id: AttributeDefinitionId,
    pub raw: String,
    pub value: AttributeValue,
}

/// Checks a full submission against the owning category's definitions:
/// required coverage, definition existence, uniqueness per definition,
/// per-type parsing, and the definition's validation rule where present.
pub fn validate_crop_attributes(
    provided: &[AttributeValueInput],
    definitions: &[AttributeDefinition],
) -> ServiceResult<Vec<ValidatedAttribute>> {
    let by_id: HashMap<AttributeDefinitionId, &AttributeDefinition> =
        definitions.iter().map(|d| (d.id, d)).collect();

    let mut provided_ids = HashSet::new();
    for input in provided {
        if !provided_ids.insert(input.attribute_definition_id) {
            return Err(ServiceError::Validation(format!(
                "attribute definition {} is provided more than once",
                input.attribute_definition_id
            )));
        }
    }

    for definition in definitions.iter().filter(|d| d.is_required) {
        if !provided_ids.contains(&definition.id) {
            return Err(ServiceError::Validation(format!(
                "required attribute '{}' is missing",
                definition.name
            )));
        }
    }

    provided
        .iter()
        .map(|input| {
            let definition = by_id.get(&input.attribute_definition_id).ok_or_else(|| {
                ServiceError::Validation(format!(
                    "attribute definition {} does not belong to this category",
                    input.attribute_definition_id
                ))
            })?;

            let value =
                AttributeValue::parse(&input.value, definition.data_type).map_err(|e| {
                    ServiceError::Validation(format!(
                        "invalid value for attribute '{}': {e}",
                        definition.name
                    ))
                })?;

            if let Some(rule) = &definition.validation_rule {
                check_rule(rule, &value, definition)?;
            }

            Ok(ValidatedAttribute {
                attribute_definition_id: input.attribute_definition_id,
                raw: input.value.trim().to_string(),
                value,
            })
        })
        .collect()
}

/// Applies a definition's validation rule to an already-typed value.
///
/// Numbers take an inclusive `"min-max"` range; strings take an anchored
/// regex (so `"A|B|C"` enumerations work as written). Rules on date and
/// boolean definitions carry no semantics and are ignored. An unparseable
/// rule rejects the value rather than waving it through.
fn check_rule(
    rule: &str,
    value: &AttributeValue,
    definition: &AttributeDefinition,
) -> ServiceResult<()> {
    match value {
        AttributeValue::Number(number) => {
            let (min, max) = parse_range(rule).ok_or_else(|| {
                ServiceError::Validation(format!(
                    "attribute '{}' carries an unusable range rule '{rule}'",
                    definition.name
                ))
            })?;
            if *number < min || *number > max {
                return Err(ServiceError::Validation(format!(
                    "value {number} for attribute '{}' is outside {min}-{max}",
                    definition.name
                )));
            }
            Ok(())
        }
        AttributeValue::String(text) => {
            let pattern = format!("^(?:{rule})$");
            let regex = Regex::new(&pattern).map_err(|_| {
                ServiceError::Validation(format!(
                    "attribute '{}' carries an unusable pattern rule '{rule}'",
                    definition.name
                ))
            })?;
            if !regex.is_match(text) {
                return Err(ServiceError::Validation(format!(
                    "value '{text}' for attribute '{}' does not match '{rule}'",
                    definition.name
                )));
            }
            Ok(())
        }
        AttributeValue::Date(_) | AttributeValue::Bool(_) => Ok(()),
    }
}

/// Parses an inclusive `"min-max"` range, tolerating a negative minimum.
fn parse_range(rule: &str) -> Option<(f64, f64)> {
    let rule = rule.trim();
    let split = rule.char_indices().skip(1).find(|&(_, c)| c == '-')?.0;
    let min = rule[..split].trim().parse::<f64>().ok()?;
    let max = rule[split + 1..].trim().parse::<f64>().ok()?;
    (min <= max).then_some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AttributeDataType, AttributeName, CategoryId};
    use chrono::{DateTime, NaiveDateTime};

    fn ts() -> NaiveDateTime {
        DateTime::from_timestamp(0, 0).unwrap().naive_utc()
    }

    fn definition(
        id: i32,
        name: &str,
        data_type: AttributeDataType,
        is_required: bool,
        validation_rule: Option<&str>,
    ) -> AttributeDefinition {
        AttributeDefinition {
            id: AttributeDefinitionId::new(id).unwrap(),
            category_id: CategoryId::new(1).unwrap(),
            name: AttributeName::new(name).unwrap(),
            data_type,
            is_required,
            validation_rule: validation_rule.map(str::to_string),
            unit: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn input(id: i32, value: &str) -> AttributeValueInput {
        AttributeValueInput {
            attribute_definition_id: AttributeDefinitionId::new(id).unwrap(),
            value: value.to_string(),
        }
    }

    #[test]
    fn missing_required_attribute_fails() {
        let definitions = vec![
            definition(1, "GrowingSeason", AttributeDataType::String, true, None),
            definition(2, "Weight", AttributeDataType::Number, true, None),
        ];

        let err =
            validate_crop_attributes(&[input(1, "Spring")], &definitions).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let ok = validate_crop_attributes(
            &[input(1, "Spring"), input(2, "1.5")],
            &definitions,
        )
        .unwrap();
        assert_eq!(ok.len(), 2);
    }

    #[test]
    fn unknown_definition_fails() {
        let definitions = vec![definition(
            1,
            "GrowingSeason",
            AttributeDataType::String,
            false,
            None,
        )];

        let err = validate_crop_attributes(&[input(9, "Spring")], &definitions).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn duplicate_definition_fails() {
        let definitions = vec![definition(
            1,
            "GrowingSeason",
            AttributeDataType::String,
            false,
            None,
        )];

        let err = validate_crop_attributes(
            &[input(1, "Spring"), input(1, "Fall")],
            &definitions,
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn number_values_must_parse() {
        let definitions = vec![definition(1, "Weight", AttributeDataType::Number, false, None)];

        let err = validate_crop_attributes(&[input(1, "abc")], &definitions).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let ok = validate_crop_attributes(&[input(1, "42")], &definitions).unwrap();
        assert_eq!(ok[0].value, AttributeValue::Number(42.0));
    }

    #[test]
    fn date_and_boolean_values_must_parse() {
        let definitions = vec![
            definition(1, "Harvested", AttributeDataType::Date, false, None),
            definition(2, "Organic", AttributeDataType::Boolean, false, None),
        ];

        assert!(
            validate_crop_attributes(&[input(1, "not-a-date")], &definitions).is_err()
        );
        assert!(validate_crop_attributes(&[input(2, "maybe")], &definitions).is_err());

        let ok = validate_crop_attributes(
            &[input(1, "2026-04-01"), input(2, "TRUE")],
            &definitions,
        )
        .unwrap();
        assert_eq!(ok[1].value, AttributeValue::Bool(true));
    }

    #[test]
    fn numeric_range_rule_is_enforced() {
        let definitions = vec![definition(
            1,
            "Weight",
            AttributeDataType::Number,
            false,
            Some("0.5-25"),
        )];

        assert!(validate_crop_attributes(&[input(1, "26")], &definitions).is_err());
        assert!(validate_crop_attributes(&[input(1, "0.4")], &definitions).is_err());
        assert!(validate_crop_attributes(&[input(1, "12")], &definitions).is_ok());
    }

    #[test]
    fn enumeration_rule_is_enforced_on_strings() {
        let definitions = vec![definition(
            1,
            "GrowingSeason",
            AttributeDataType::String,
            false,
            Some("Spring|Summer|Fall"),
        )];

        assert!(validate_crop_attributes(&[input(1, "Winter")], &definitions).is_err());
        assert!(validate_crop_attributes(&[input(1, "Fall")], &definitions).is_ok());
    }

    #[test]
    fn unusable_rules_fail_closed() {
        let bad_range = vec![definition(
            1,
            "Weight",
            AttributeDataType::Number,
            false,
            Some("heavy"),
        )];
        assert!(validate_crop_attributes(&[input(1, "12")], &bad_range).is_err());

        let bad_pattern = vec![definition(
            1,
            "GrowingSeason",
            AttributeDataType::String,
            false,
            Some("(unclosed"),
        )];
        assert!(validate_crop_attributes(&[input(1, "Spring")], &bad_pattern).is_err());
    }

    #[test]
    fn range_parser_handles_negatives() {
        assert_eq!(parse_range("-5-5"), Some((-5.0, 5.0)));
        assert_eq!(parse_range("10-20"), Some((10.0, 20.0)));
        assert_eq!(parse_range("20-10"), None);
        assert_eq!(parse_range("warm"), None);
    }
}
