//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs carry these wrappers instead of raw primitives so that
//! identifiers, names and enumerated states are enforced at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trim_and_require_non_empty(value, $field).map(Self)
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

id_newtype!(
    CategoryId,
    "Unique identifier for a crop category.",
    "category_id"
);
id_newtype!(
    AttributeDefinitionId,
    "Unique identifier for an attribute definition.",
    "attribute_definition_id"
);
id_newtype!(CropId, "Unique identifier for a crop.", "crop_id");
id_newtype!(
    CropAttributeValueId,
    "Unique identifier for a crop attribute value.",
    "crop_attribute_value_id"
);

non_empty_string_newtype!(
    CategoryName,
    "Category display name enforcing non-empty values.",
    "category name"
);
non_empty_string_newtype!(
    AttributeName,
    "Attribute definition name enforcing non-empty values.",
    "attribute name"
);
non_empty_string_newtype!(
    CropName,
    "Crop display name enforcing non-empty values.",
    "crop name"
);
non_empty_string_newtype!(
    AttributeUnit,
    "Display unit attached to an attribute definition.",
    "unit"
);

/// Moderation state of a category.
///
/// Categories are proposed by farmers and enter the catalog as `Pending`;
/// only moderators move them to `Approved` or `Rejected`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    Pending,
    Approved,
    Rejected,
}

impl CategoryStatus {
    /// String representation used in persistence.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl Display for CategoryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for CategoryStatus {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "category status: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for CategoryStatus {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<CategoryStatus> for String {
    fn from(value: CategoryStatus) -> Self {
        value.as_str().to_string()
    }
}

/// Declared type of an attribute's values.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AttributeDataType {
    String,
    Number,
    Date,
    Boolean,
}

impl AttributeDataType {
    /// String representation used in persistence.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
            Self::Boolean => "boolean",
        }
    }
}

impl Display for AttributeDataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for AttributeDataType {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "boolean" => Ok(Self::Boolean),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "attribute data type: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for AttributeDataType {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<AttributeDataType> for String {
    fn from(value: AttributeDataType) -> Self {
        value.as_str().to_string()
    }
}

/// Sort key accepted by the crop search engine.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CropSortBy {
    #[default]
    Name,
    Category,
    Offers,
}

impl CropSortBy {
    /// String representation accepted in search forms.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::Offers => "offers",
        }
    }
}

impl Display for CropSortBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for CropSortBy {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "name" => Ok(Self::Name),
            "category" => Ok(Self::Category),
            "offers" => Ok(Self::Offers),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "sort key: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_non_empty_strings() {
        let value = CategoryName::new("  Vegetables  ").unwrap();
        assert_eq!(value.as_str(), "Vegetables");
    }

    #[test]
    fn rejects_empty_names() {
        let err = AttributeName::new("   ").unwrap_err();
        assert_eq!(err, TypeConstraintError::EmptyString("attribute name"));
    }

    #[test]
    fn rejects_non_positive_ids() {
        let err = CategoryId::new(0).unwrap_err();
        assert_eq!(err, TypeConstraintError::NonPositiveId("category_id"));
        assert!(CategoryId::new(1).is_ok());
    }

    #[test]
    fn category_status_round_trips_through_strings() {
        for status in [
            CategoryStatus::Pending,
            CategoryStatus::Approved,
            CategoryStatus::Rejected,
        ] {
            assert_eq!(CategoryStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(CategoryStatus::try_from("archived").is_err());
    }

    #[test]
    fn data_type_rejects_unknown_values() {
        assert_eq!(
            AttributeDataType::try_from("number").unwrap(),
            AttributeDataType::Number
        );
        assert!(AttributeDataType::try_from("decimal").is_err());
    }

    #[test]
    fn sort_key_defaults_to_name() {
        assert_eq!(CropSortBy::default(), CropSortBy::Name);
        assert_eq!(CropSortBy::try_from("offers").unwrap(), CropSortBy::Offers);
    }
}
