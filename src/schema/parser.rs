//! Schema document parsing.
//!
//! Converts a raw RFC 7643 Section 7 schema document into a typed [`Schema`].
//! Unknown keys are ignored at every level so that newer or vendor-extended
//! documents still parse. Attribute order is preserved.

use log::debug;
use serde_json::{Map, Value as JsonValue};
use std::str::FromStr;

use super::types::{
    Attribute, AttributeKind, AttributeType, Mutability, ReferenceType, Returned, Schema,
    Uniqueness, is_valid_attribute_name,
};
use crate::error::{SchemaError, SchemaResult};

/// Sub-attribute name reserved by RFC 7643 Section 2.4 for resource references.
const REF_SUB_ATTRIBUTE: &str = "$ref";

type JsonObject = Map<String, JsonValue>;

/// Parse a schema document from raw bytes.
///
/// ```rust
/// use scim_suite::schema::{AttributeType, parse_schema};
///
/// let schema = parse_schema(br#"{
///     "id": "urn:example:schemas:Device",
///     "attributes": [
///         {"name": "serial", "type": "string", "uniqueness": "server"},
///         {"name": "owner", "type": "reference", "referenceTypes": ["User"]}
///     ]
/// }"#).unwrap();
/// assert_eq!(schema.attributes[1].attribute_type(), AttributeType::Reference);
/// ```
pub fn parse_schema(raw: &[u8]) -> SchemaResult<Schema> {
    let document: JsonValue =
        serde_json::from_slice(raw).map_err(|e| SchemaError::MalformedInput {
            message: e.to_string(),
        })?;
    parse_schema_value(&document)
}

/// Parse a schema document that has already been deserialized.
pub fn parse_schema_value(document: &JsonValue) -> SchemaResult<Schema> {
    let object = document
        .as_object()
        .ok_or_else(|| SchemaError::MalformedInput {
            message: "schema document must be a JSON object".to_string(),
        })?;

    let id = optional_str(object, "id")?
        .filter(|id| !id.is_empty())
        .ok_or(SchemaError::MissingId)?
        .to_string();
    let name = optional_str(object, "name")?.map(str::to_string);
    let description = optional_str(object, "description")?.map(str::to_string);

    let attributes = match optional_array(object, "attributes")? {
        Some(items) => items
            .iter()
            .map(|item| parse_attribute(item, false))
            .collect::<SchemaResult<Vec<_>>>()?,
        None => Vec::new(),
    };

    debug!("Parsed schema {} with {} attribute(s)", id, attributes.len());

    Ok(Schema {
        id,
        name,
        description,
        attributes,
    })
}

/// Parse one attribute definition. `nested` is true for sub-attributes.
fn parse_attribute(value: &JsonValue, nested: bool) -> SchemaResult<Attribute> {
    let container = if nested { "subAttributes" } else { "attributes" };
    let object = value.as_object().ok_or_else(|| SchemaError::TypeMismatch {
        field: container.to_string(),
        expected: "array of objects",
    })?;

    let name = optional_str(object, "name")?.unwrap_or_default();
    let reserved = nested && name == REF_SUB_ATTRIBUTE;
    if !reserved && !is_valid_attribute_name(name) {
        return Err(SchemaError::InvalidAttributeName {
            name: name.to_string(),
        });
    }

    let attribute_type: AttributeType = optional_str(object, "type")?.unwrap_or_default().parse()?;

    let kind = match attribute_type {
        AttributeType::String => AttributeKind::String {
            case_exact: optional_bool(object, "caseExact")?.unwrap_or(false),
            canonical_values: optional_strings(object, "canonicalValues")?.unwrap_or_default(),
        },
        AttributeType::Boolean => AttributeKind::Boolean,
        AttributeType::Decimal => AttributeKind::Decimal,
        AttributeType::Integer => AttributeKind::Integer,
        AttributeType::DateTime => AttributeKind::DateTime,
        AttributeType::Binary => AttributeKind::Binary,
        AttributeType::Reference => AttributeKind::Reference {
            reference_types: optional_strings(object, "referenceTypes")?
                .unwrap_or_default()
                .iter()
                .map(|token| ReferenceType::from(token.as_str()))
                .collect(),
        },
        AttributeType::Complex => {
            if nested {
                return Err(SchemaError::NestedComplexAttribute {
                    attribute: name.to_string(),
                });
            }
            let sub_attributes = optional_array(object, "subAttributes")?
                .map(|items| {
                    items
                        .iter()
                        .map(|item| parse_attribute(item, true))
                        .collect::<SchemaResult<Vec<_>>>()
                })
                .transpose()?
                .unwrap_or_default();
            if sub_attributes.is_empty() {
                return Err(SchemaError::EmptySubAttributes {
                    attribute: name.to_string(),
                });
            }
            AttributeKind::Complex { sub_attributes }
        }
    };

    let uniqueness = optional_token::<Uniqueness>(object, Uniqueness::FIELD)?.unwrap_or_default();

    Ok(Attribute {
        name: name.to_string(),
        description: optional_str(object, "description")?.map(str::to_string),
        multi_valued: optional_bool(object, "multiValued")?.unwrap_or(false),
        required: optional_bool(object, "required")?.unwrap_or(false),
        mutability: optional_token(object, Mutability::FIELD)?.unwrap_or_default(),
        returned: optional_token(object, Returned::FIELD)?.unwrap_or_default(),
        uniqueness: if attribute_type.supports_uniqueness() {
            uniqueness
        } else {
            Uniqueness::None
        },
        kind,
    })
}

/// Look up a field, treating JSON `null` the same as absence.
fn field<'a>(object: &'a JsonObject, key: &str) -> Option<&'a JsonValue> {
    object.get(key).filter(|value| !value.is_null())
}

fn mismatch(key: &str, expected: &'static str) -> SchemaError {
    SchemaError::TypeMismatch {
        field: key.to_string(),
        expected,
    }
}

fn optional_str<'a>(object: &'a JsonObject, key: &str) -> SchemaResult<Option<&'a str>> {
    field(object, key)
        .map(|value| value.as_str().ok_or_else(|| mismatch(key, "string")))
        .transpose()
}

fn optional_bool(object: &JsonObject, key: &str) -> SchemaResult<Option<bool>> {
    field(object, key)
        .map(|value| value.as_bool().ok_or_else(|| mismatch(key, "boolean")))
        .transpose()
}

fn optional_array<'a>(
    object: &'a JsonObject,
    key: &str,
) -> SchemaResult<Option<&'a Vec<JsonValue>>> {
    field(object, key)
        .map(|value| value.as_array().ok_or_else(|| mismatch(key, "array")))
        .transpose()
}

fn optional_strings(object: &JsonObject, key: &str) -> SchemaResult<Option<Vec<String>>> {
    optional_array(object, key)?
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| mismatch(key, "array of strings"))
                })
                .collect()
        })
        .transpose()
}

fn optional_token<T>(object: &JsonObject, key: &str) -> SchemaResult<Option<T>>
where
    T: FromStr<Err = SchemaError>,
{
    optional_str(object, key)?
        .map(|token| token.parse::<T>())
        .transpose()
}
